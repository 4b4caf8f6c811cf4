use ammonia::clean_text;

use crate::db::models::QuoteRequest;
use crate::mail::mailer::OutgoingEmail;

/// Admin notification for a new quote request. The visitor becomes the reply-to.
pub fn quote_notification(quote: &QuoteRequest, from: &str, admin: &str) -> OutgoingEmail {
    let message = if quote.message.trim().is_empty() {
        "<em>No message provided.</em>".to_string()
    } else {
        clean_text(&quote.message).replace('\n', "<br>")
    };

    let html = format!(
        "<h2>New quote request</h2>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> {email}</p>\
         <p><strong>Service type:</strong> {service}</p>\
         <p><strong>Guests:</strong> {guests}</p>\
         <p><strong>Message:</strong><br>{message}</p>",
        name = clean_text(&quote.name),
        email = clean_text(&quote.email),
        service = clean_text(&quote.service_type),
        guests = quote.guests,
        message = message,
    );

    OutgoingEmail {
        subject: format!("New quote request from {}", quote.name),
        html,
        from: from.to_string(),
        reply_to: Some(quote.email.clone()),
        to: vec![admin.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(message: &str) -> QuoteRequest {
        QuoteRequest {
            id: "64b7f0c2a1b2c3d4e5f60718".into(),
            name: "Ada <script>".into(),
            email: "ada@example.com".into(),
            service_type: "Wedding".into(),
            guests: 120,
            message: message.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_input_is_escaped() {
        let email = quote_notification(&quote("hi"), "noreply@x.test", "admin@x.test");
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_addresses() {
        let email = quote_notification(&quote(""), "noreply@x.test", "admin@x.test");
        assert_eq!(email.to, vec!["admin@x.test"]);
        assert_eq!(email.reply_to.as_deref(), Some("ada@example.com"));
        assert!(email.html.contains("No message provided"));
        assert!(email.html.contains("120"));
    }
}
