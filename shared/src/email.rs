use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;

const SUBJECT: &str = "You've been invited to manage the website";

/// Escape text for use inside HTML content or a quoted attribute
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the invitation as (html, text)
pub fn render_invite(redirect_url: &str) -> (String, String) {
    let html_body = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{
            font-family: 'HelveticaNeue', Helvetica, Arial, sans-serif;
            line-height: 1.6;
            color: #333333;
            margin: 0;
            padding: 0;
        }}
        .wrapper {{
            max-width: 600px;
            margin: 0 auto;
            padding: 60px 20px;
        }}
        .container {{
            border: 1px solid #e5e5e5;
            padding: 48px 40px;
        }}
        .title {{
            font-size: 20px;
            font-weight: 300;
            margin: 0 0 24px 0;
        }}
        .button {{
            display: inline-block;
            padding: 16px 24px;
            background: #2f6b3a;
            color: #ffffff;
            text-decoration: none;
        }}
        .footer {{
            margin-top: 40px;
            font-size: 13px;
            color: #666666;
        }}
    </style>
</head>
<body>
    <div class="wrapper">
        <div class="container">
            <h2 class="title">You've been invited</h2>
            <p>
                An administrator has given you access to the website content editor.
                Follow the link below and choose a password to finish setting up your account.
            </p>
            <p><a href="{}" class="button">Set up my account</a></p>
            <p class="footer">If you didn't expect this, you can safely ignore this email.</p>
        </div>
    </div>
</body>
</html>"#,
        escape_html(redirect_url)
    );

    let text_body = format!(
        r#"You've been invited

An administrator has given you access to the website content editor.
Follow the link below and choose a password to finish setting up your account:

{}

If you didn't expect this, you can safely ignore this email."#,
        redirect_url
    );

    (html_body, text_body)
}

fn utf8_content(part: &str, data: impl Into<String>) -> Result<Content, String> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| format!("Failed to build {}: {:?}", part, e))
}

/// Send the invitation mail via AWS SES
pub async fn send_invite_email(
    ses_client: &SesClient,
    from_email: &str,
    to_email: &str,
    redirect_url: &str,
) -> Result<(), String> {
    let (html_body, text_body) = render_invite(redirect_url);

    let destination = Destination::builder().to_addresses(to_email).build();

    let subject = utf8_content("subject", SUBJECT)?;
    let html_content = utf8_content("HTML content", html_body)?;
    let text_content = utf8_content("text content", text_body)?;

    let body = Body::builder().html(html_content).text(text_content).build();

    let message = Message::builder().subject(subject).body(body).build();

    let email_content = EmailContent::builder().simple(message).build();

    ses_client
        .send_email()
        .from_email_address(from_email)
        .destination(destination)
        .content(email_content)
        .send()
        .await
        .map_err(|e| format!("Failed to send email: {:?}", e))?;

    Ok(())
}
