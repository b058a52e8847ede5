use derive_more::Display;
use unicode_segmentation::UnicodeSegmentation;

/// Longest header line allowed by RFC 5322.
const MAX_SUBJECT_LENGTH: usize = 998;

#[derive(Display, Debug, Clone)]
#[display(fmt = "{}", _0)]
pub struct Subject(String);

impl TryFrom<String> for Subject {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim().to_owned();
        if value.is_empty() {
            return Err("subject is empty".into());
        }

        if value.graphemes(true).count() > MAX_SUBJECT_LENGTH {
            return Err("subject is too long".into());
        }

        if value.contains(['\r', '\n']) {
            return Err("subject must fit on a single line".into());
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for Subject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
