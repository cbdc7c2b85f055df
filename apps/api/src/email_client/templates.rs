use super::OutboundEmail;

pub const INVITE_SUBJECT: &str = "You're invited to share your Restorative Record";
pub const REINVITE_SUBJECT: &str = "Reminder: share your Restorative Record";

/// Builds the invitation email. `reminder` switches the subject line only.
pub fn invitation_email(
    to: &str,
    company: Option<&str>,
    sender: &str,
    app_base_url: &str,
    reminder: bool,
) -> OutboundEmail {
    let link = format!("{app_base_url}/signup?email={}", urlencoding::encode(to));
    let company = escape_html(company.unwrap_or("An employer"));
    let sender = escape_html(sender);
    let html = format!(
        r#"<p>Hello,</p>
<p>{company} has invited you to create a Restorative Record and share it with their hiring team as part of a Fair Chance hiring process.</p>
<p>Your record lets you present your education, employment, skills and rehabilitation history in your own words. You decide who can see it and can revoke access at any time.</p>
<p><a href="{link}">Create or update your Restorative Record</a></p>
<p>Sent on behalf of {sender}.</p>"#
    );

    OutboundEmail {
        to: to.to_string(),
        subject: if reminder {
            REINVITE_SUBJECT
        } else {
            INVITE_SUBJECT
        }
        .to_string(),
        html,
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_contains_link_and_company() {
        let email = invitation_email(
            "jo+x@example.com",
            Some("Acme & Co"),
            "Pat Lee",
            "https://app.example.com",
            false,
        );
        assert_eq!(email.subject, INVITE_SUBJECT);
        assert!(email.html.contains("Acme &amp; Co"));
        assert!(email
            .html
            .contains("https://app.example.com/signup?email=jo%2Bx%40example.com"));
    }

    #[test]
    fn test_reminder_subject() {
        let email = invitation_email("a@b.c", None, "HR", "http://x", true);
        assert_eq!(email.subject, REINVITE_SUBJECT);
        assert!(email.html.contains("An employer"));
    }

    #[test]
    fn test_company_braces_are_not_reinterpolated() {
        let email = invitation_email("a@b.c", Some("{sender} Inc"), "Pat", "http://x", false);
        assert!(email.html.contains("{sender} Inc has invited you"));
        assert!(email.html.contains("on behalf of Pat."));
    }
}
