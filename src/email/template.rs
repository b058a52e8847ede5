use askama::Template;

use crate::{
    config::NewsletterSettings,
    domain::newsletter::{attachment::Attachment, link::Link, NewsletterRequest},
};

#[derive(Template)]
#[template(path = "newsletter.html")]
struct HtmlTemplate<'a> {
    subject: &'a str,
    paragraphs: &'a [&'a str],
    links: &'a [Link],
    team_name: &'a str,
    logo_url: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "newsletter.txt")]
struct TextTemplate<'a> {
    subject: &'a str,
    paragraphs: &'a [&'a str],
    links: &'a [Link],
    team_name: &'a str,
}

/// A newsletter rendered once per request and shared by every send of the batch.
#[derive(Debug, Clone)]
pub struct Issue {
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl Issue {
    pub fn render(
        request: &NewsletterRequest,
        branding: &NewsletterSettings,
    ) -> Result<Self, askama::Error> {
        let paragraphs = request.body.paragraphs();

        let html = HtmlTemplate {
            subject: request.subject.as_ref(),
            paragraphs: &paragraphs,
            links: &request.links,
            team_name: &branding.team_name,
            logo_url: branding.logo_url.as_deref(),
        }
        .render()?;

        let text = TextTemplate {
            subject: request.subject.as_ref(),
            paragraphs: &paragraphs,
            links: &request.links,
            team_name: &branding.team_name,
        }
        .render()?;

        Ok(Self {
            subject: request.subject.to_string(),
            html,
            text,
            attachments: request.attachments.clone(),
        })
    }
}
