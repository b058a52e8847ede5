use derive_more::Display;
use validator::validate_url;

#[derive(Display, Debug, Clone)]
#[display(fmt = "{}", _0)]
pub struct Link(String);

impl TryFrom<String> for Link {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_owned();
        let has_web_scheme = value.starts_with("http://") || value.starts_with("https://");
        if has_web_scheme && validate_url(&value) {
            Ok(Self(value))
        } else {
            Err(format!("`{}` is not a valid http(s) link.", value))
        }
    }
}

impl AsRef<str> for Link {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
