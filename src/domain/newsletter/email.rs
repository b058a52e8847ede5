use derive_more::Display;
use lettre::Address;
use validator::validate_email;

/// A recipient address that both passes validation and can be used as an SMTP mailbox.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
#[display(fmt = "{}", _0)]
pub struct Email(Address);

impl Email {
    pub fn address(&self) -> &Address {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        let address = validate_email(value)
            .then(|| value.parse::<Address>().ok())
            .flatten()
            .ok_or_else(|| format!("`{}` is not a valid email address.", value))?;
        Ok(Self(address))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}
