pub mod attachment;
pub mod body;
pub mod email;
pub mod link;
pub mod subject;

use self::attachment::Attachment;
use self::body::Body;
use self::email::Email;
use self::link::Link;
use self::subject::Subject;

/// A validated request to send one newsletter issue to a batch of recipients.
pub struct NewsletterRequest {
    pub recipients: Vec<Email>,
    pub subject: Subject,
    pub body: Body,
    pub links: Vec<Link>,
    pub attachments: Vec<Attachment>,
}
