/// Free text of a newsletter, split into paragraphs on blank lines when rendered.
#[derive(Debug, Clone)]
pub struct Body(String);

impl Body {
    pub fn paragraphs(&self) -> Vec<&str> {
        self.0
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

impl TryFrom<String> for Body {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err("message is empty".into());
        }
        Ok(Self(value.replace("\r\n", "\n")))
    }
}

impl AsRef<str> for Body {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
