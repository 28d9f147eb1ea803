//! Input validation for form submissions.
//!
//! Pure checks only. Order matters: the first failure is the one reported.

use crate::{
    errors::SubmissionError,
    models::submission::{FileField, RawSubmission, SubmissionInput},
};
use validator::ValidateEmail;

/// Declared MIME types accepted for the image.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Largest accepted image, 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Validate a raw submission.
///
/// Checks, in order: required text fields (name, email, location, memory),
/// email grammar, file presence, declared content type, size.
pub fn validate(raw: RawSubmission) -> Result<SubmissionInput, SubmissionError> {
    let name = required("name", raw.name)?;
    let email = required("email", raw.email)?;
    let location = required("location", raw.location)?;
    let memory = required("memory", raw.memory)?;

    if !email.validate_email() {
        return Err(SubmissionError::InvalidEmail);
    }

    let image = match raw.image {
        FileField::Received(image) => image,
        FileField::Missing => {
            return Err(SubmissionError::UploadError("no file provided".into()));
        }
    };

    if !ALLOWED_CONTENT_TYPES.contains(&image.content_type.as_str()) {
        return Err(SubmissionError::UnsupportedType(image.content_type));
    }

    if image.size > MAX_IMAGE_BYTES {
        return Err(SubmissionError::FileTooLarge { size: image.size });
    }

    Ok(SubmissionInput {
        name,
        email,
        location,
        memory,
        image,
    })
}

fn required(field: &'static str, value: Option<String>) -> Result<String, SubmissionError> {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(SubmissionError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::ImageUpload;
    use bytes::Bytes;

    fn jpeg(size: usize) -> ImageUpload {
        ImageUpload::new("kyoto.jpg", "image/jpeg", Bytes::from(vec![0xFF; size]))
    }

    fn valid() -> RawSubmission {
        RawSubmission {
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            location: Some("Kyoto".into()),
            memory: Some("Cherry blossoms".into()),
            image: FileField::Received(jpeg(200 * 1024)),
        }
    }

    #[test]
    fn accepts_a_complete_submission_and_trims_fields() {
        let mut raw = valid();
        raw.name = Some("  Alice \n".into());
        raw.email = Some(" alice@example.com ".into());

        let input = validate(raw).unwrap();
        assert_eq!(input.name, "Alice");
        assert_eq!(input.email, "alice@example.com");
        assert_eq!(input.location, "Kyoto");
        assert_eq!(input.image.size, 200 * 1024);
    }

    #[test]
    fn reports_first_missing_field_in_fixed_order() {
        let cases: [(fn(&mut RawSubmission), &str); 4] = [
            (|r| r.name = None, "name"),
            (|r| r.email = Some("   ".into()), "email"),
            (|r| r.location = Some(String::new()), "location"),
            (|r| r.memory = Some("\t".into()), "memory"),
        ];
        for (clear, expected) in cases {
            let mut raw = valid();
            clear(&mut raw);
            match validate(raw) {
                Err(SubmissionError::MissingField(field)) => assert_eq!(field, expected),
                other => panic!("expected MissingField({}), got {:?}", expected, other),
            }
        }

        let raw = RawSubmission {
            email: None,
            memory: None,
            ..valid()
        };
        assert!(matches!(
            validate(raw),
            Err(SubmissionError::MissingField("email"))
        ));
    }

    #[test]
    fn missing_fields_are_reported_before_file_problems() {
        let raw = RawSubmission {
            location: None,
            image: FileField::Missing,
            ..valid()
        };
        assert!(matches!(
            validate(raw),
            Err(SubmissionError::MissingField("location"))
        ));
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["not-an-email", "alice@", "@example.com", "alice example@x.com"] {
            let raw = RawSubmission {
                email: Some(email.into()),
                ..valid()
            };
            assert!(
                matches!(validate(raw), Err(SubmissionError::InvalidEmail)),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn requires_a_received_file() {
        let raw = RawSubmission {
            image: FileField::Missing,
            ..valid()
        };
        match validate(raw) {
            Err(SubmissionError::UploadError(reason)) => assert_eq!(reason, "no file provided"),
            other => panic!("expected UploadError, got {:?}", other),
        }
    }

    #[test]
    fn only_declared_image_types_are_allowed() {
        for content_type in ALLOWED_CONTENT_TYPES {
            let raw = RawSubmission {
                image: FileField::Received(ImageUpload::new("a", content_type, Bytes::new())),
                ..valid()
            };
            assert!(validate(raw).is_ok(), "{} should be accepted", content_type);
        }

        for content_type in ["application/pdf", "image/webp", "IMAGE/PNG", ""] {
            let raw = RawSubmission {
                image: FileField::Received(ImageUpload::new("a.png", content_type, Bytes::new())),
                ..valid()
            };
            match validate(raw) {
                Err(SubmissionError::UnsupportedType(declared)) => {
                    assert_eq!(declared, content_type)
                }
                other => panic!("expected UnsupportedType, got {:?}", other),
            }
        }
    }

    #[test]
    fn enforces_the_five_mebibyte_limit() {
        let raw = RawSubmission {
            image: FileField::Received(jpeg(MAX_IMAGE_BYTES as usize)),
            ..valid()
        };
        assert!(validate(raw).is_ok());

        let raw = RawSubmission {
            image: FileField::Received(jpeg(MAX_IMAGE_BYTES as usize + 1)),
            ..valid()
        };
        assert!(matches!(
            validate(raw),
            Err(SubmissionError::FileTooLarge { size }) if size == MAX_IMAGE_BYTES + 1
        ));
    }

    #[test]
    fn type_is_checked_before_size() {
        let raw = RawSubmission {
            image: FileField::Received(ImageUpload::new(
                "big.pdf",
                "application/pdf",
                Bytes::from(vec![0; MAX_IMAGE_BYTES as usize + 1]),
            )),
            ..valid()
        };
        assert!(matches!(
            validate(raw),
            Err(SubmissionError::UnsupportedType(_))
        ));
    }
}
