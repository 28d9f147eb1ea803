//! HTML output for the submission endpoint.

use crate::models::{stored_image::StoredImage, submission::SubmissionInput};

/// Confirmation page shown after a submission is stored.
pub fn success_page(input: &SubmissionInput, image: &StoredImage) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Success</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            display: flex;
            justify-content: center;
            align-items: center;
            margin: 0;
        }}
        .success-box {{
            background: white;
            padding: 40px;
            border-radius: 15px;
            box-shadow: 0 20px 60px rgba(0,0,0,0.3);
            text-align: center;
            max-width: 500px;
        }}
        h1 {{ color: #28a745; margin-bottom: 20px; }}
        p {{ color: #333; margin-bottom: 10px; line-height: 1.6; }}
        .image-preview {{
            margin: 20px 0;
            max-width: 100%;
            max-height: 300px;
            border-radius: 8px;
            box-shadow: 0 4px 8px rgba(0,0,0,0.1);
        }}
        .note {{ font-size: 12px; color: #666; }}
        a {{
            display: inline-block;
            margin-top: 20px;
            padding: 12px 30px;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            text-decoration: none;
            border-radius: 8px;
            font-weight: 600;
        }}
        a:hover {{ opacity: 0.9; }}
    </style>
</head>
<body>
    <div class="success-box">
        <h1>Success!</h1>
        <p><strong>Thank you, {name}!</strong></p>
        <p>Your travel memory from <strong>{location}</strong> has been uploaded successfully.</p>
        <img src="{url}" alt="Travel Memory" class="image-preview">
        <p class="note">Image stored and details saved to the database</p>
        <a href="index.html">Upload Another Memory</a>
    </div>
</body>
</html>
"#,
        name = html_escape(&input.name),
        location = html_escape(&input.location),
        url = html_escape(&image.url),
    )
}

/// Short terminal message: `<category>: <detail>`.
pub fn error_message(category: &str, detail: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\"><title>{category}</title></head><body><p>{category}: {detail}</p></body></html>",
        category = html_escape(category),
        detail = html_escape(detail),
    )
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::ImageUpload;
    use bytes::Bytes;

    fn input(name: &str, location: &str) -> SubmissionInput {
        SubmissionInput {
            name: name.into(),
            email: "alice@example.com".into(),
            location: location.into(),
            memory: "Cherry blossoms".into(),
            image: ImageUpload::new("kyoto.jpg", "image/jpeg", Bytes::new()),
        }
    }

    fn image(url: &str) -> StoredImage {
        StoredImage {
            key: "images/travel_1_abc.jpg".into(),
            url: url.into(),
            content_type: "image/jpeg".into(),
        }
    }

    #[test]
    fn success_page_embeds_name_location_and_image() {
        let url = "https://bucket.s3.us-east-1.amazonaws.com/images/travel_1_abc.jpg";
        let page = success_page(&input("Alice", "Kyoto"), &image(url));
        assert!(page.contains("Thank you, Alice!"));
        assert!(page.contains("<strong>Kyoto</strong>"));
        assert!(page.contains(&format!(r#"<img src="{}""#, url)));
        assert!(!page.contains("Cherry blossoms"));
    }

    #[test]
    fn success_page_escapes_user_text() {
        let page = success_page(
            &input("<script>alert(1)</script>", "Tom & Jerry's \"Place\""),
            &image("https://x/a.jpg\" onerror=\"alert(1)"),
        );
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("Tom &amp; Jerry&#039;s &quot;Place&quot;"));
        assert!(page.contains("a.jpg&quot; onerror=&quot;alert(1)"));
    }

    #[test]
    fn error_message_names_category_and_detail() {
        let body = error_message("Storage Error", "AccessDenied <bucket>");
        assert!(body.contains("<p>Storage Error: AccessDenied &lt;bucket&gt;</p>"));
    }
}
