use serde_json::Value;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::dto::{JobEvent, RawJobInput, RawParams, RawS3Config, RawWebhook};
use super::error::JobError;
use super::model::{
    Callback, GenerationParams, JobRequest, StorageTarget, DEFAULT_DURATION_S, DEFAULT_FPS,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

/// Turns a raw host event into a [`JobRequest`].
///
/// Pure: nothing is generated, uploaded or notified here, so a rejected
/// event leaves no trace outside the returned error.
pub fn validate_event(event: Value) -> Result<JobRequest, JobError> {
    let event: JobEvent = serde_json::from_value(event)
        .map_err(|e| JobError::Validation(format!("malformed job event: {}", e)))?;

    validate(event.input.unwrap_or_default())
}

pub fn validate(input: RawJobInput) -> Result<JobRequest, JobError> {
    let params = parse_params(input.params.unwrap_or_default())?;
    let RawS3Config {
        bucket,
        region,
        endpoint_url,
        access_key,
        secret_key,
    } = input.s3.unwrap_or_default();
    let RawWebhook { url, secret } = input.webhook.unwrap_or_default();

    let job = JobRequest {
        job_id: required(input.job_id),
        params,
        storage: StorageTarget {
            bucket: required(bucket),
            region: non_empty(region),
            endpoint_url: non_empty(endpoint_url),
            access_key: non_empty(access_key),
            secret_key: non_empty(secret_key),
        },
        output_prefix: required(input.output_prefix),
        webhook: Callback {
            url: required(url),
            secret: non_empty(secret),
        },
    };

    job.validate()
        .map_err(|e| JobError::Validation(describe(&e)))?;

    Ok(job)
}

/// Values are kept verbatim; only absent or `""` fails the length check.
fn required(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_params(raw: RawParams) -> Result<GenerationParams, JobError> {
    Ok(GenerationParams {
        duration_s: parse_int("duration_s", raw.duration_s, DEFAULT_DURATION_S)?,
        fps: parse_int("fps", raw.fps, DEFAULT_FPS)?,
        width: parse_int("width", raw.width, DEFAULT_WIDTH)?,
        height: parse_int("height", raw.height, DEFAULT_HEIGHT)?,
    })
}

/// Accepts integers, integral floats and integer strings; null counts as absent.
/// Negative values map to 0 so the range check reports them.
fn parse_int(name: &str, value: Option<Value>, default: u32) -> Result<u32, JobError> {
    let invalid = || JobError::Validation(format!("params.{} must be an integer", name));

    let parsed = match value {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
            _ => return Err(invalid()),
        },
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };

    if parsed < 0 {
        return Ok(0);
    }
    u32::try_from(parsed)
        .map_err(|_| JobError::Validation(format!("params.{} is out of range", name)))
}

/// Flattens validator output into a stable, human readable message.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.sort();
    messages.dedup();
    messages.join("; ")
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("{} is invalid", path),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_event() -> Value {
        json!({
            "input": {
                "job_id": "j1",
                "params": {"duration_s": 2, "fps": 10, "width": 320, "height": 240},
                "s3": {"bucket": "b"},
                "output_prefix": "out/j1",
                "webhook": {"url": "http://x/hook"}
            }
        })
    }

    fn error_message(result: Result<JobRequest, JobError>) -> String {
        match result {
            Err(JobError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_event() {
        let job = validate_event(full_event()).unwrap();

        assert_eq!(job.job_id, "j1");
        assert_eq!(
            job.params,
            GenerationParams {
                duration_s: 2,
                fps: 10,
                width: 320,
                height: 240
            }
        );
        assert_eq!(job.storage.bucket, "b");
        assert_eq!(job.output_prefix, "out/j1");
        assert_eq!(job.webhook.url, "http://x/hook");
        assert!(job.webhook.secret.is_none());
        assert_eq!(job.output_key(), "out/j1/video.mp4");
    }

    #[test]
    fn test_defaults_applied_when_params_absent() {
        let mut event = full_event();
        event["input"].as_object_mut().unwrap().remove("params");

        let job = validate_event(event).unwrap();
        assert_eq!(job.params, GenerationParams::default());
        assert_eq!(job.params.duration_s, 5);
        assert_eq!(job.params.fps, 24);
        assert_eq!(job.params.width, 1280);
        assert_eq!(job.params.height, 720);
    }

    #[test]
    fn test_partial_params_keep_defaults() {
        let mut event = full_event();
        event["input"]["params"] = json!({"fps": "30", "width": null});

        let job = validate_event(event).unwrap();
        assert_eq!(job.params.fps, 30);
        assert_eq!(job.params.width, 1280);
        assert_eq!(job.params.duration_s, 5);
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        for path in [
            ("job_id", None),
            ("output_prefix", None),
            ("s3", Some("bucket")),
            ("webhook", Some("url")),
        ] {
            let mut event = full_event();
            let input = event["input"].as_object_mut().unwrap();
            match path {
                (field, None) => {
                    input.remove(field);
                }
                (parent, Some(child)) => {
                    input[parent].as_object_mut().unwrap().remove(child);
                }
            }

            let message = error_message(validate_event(event));
            assert!(message.contains("is required"), "{}", message);
        }
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let mut event = full_event();
        event["input"]["job_id"] = json!("");
        event["input"]["webhook"]["url"] = json!("");

        let message = error_message(validate_event(event));
        assert_eq!(message, "job_id is required; webhook.url is required");
    }

    #[test]
    fn test_identifiers_kept_verbatim() {
        let mut event = full_event();
        event["input"]["job_id"] = json!("  j1 ");
        event["input"]["output_prefix"] = json!(" out/j1 ");

        let job = validate_event(event).unwrap();
        assert_eq!(job.job_id, "  j1 ");
        assert_eq!(job.output_prefix, " out/j1 ");
        assert_eq!(job.output_key(), " out/j1 /video.mp4");
    }

    #[test]
    fn test_whitespace_job_id_is_present() {
        let mut event = full_event();
        event["input"]["job_id"] = json!("   ");

        assert_eq!(validate_event(event).unwrap().job_id, "   ");
    }

    #[test]
    fn test_missing_input_envelope() {
        let message = error_message(validate_event(json!({})));
        assert!(message.contains("job_id is required"));
        assert!(message.contains("s3.bucket is required"));
    }

    #[test]
    fn test_non_positive_params_rejected() {
        let mut event = full_event();
        event["input"]["params"]["fps"] = json!(0);
        event["input"]["params"]["width"] = json!(-5);

        let message = error_message(validate_event(event));
        assert!(message.contains("params.fps must be at least 1"));
        assert!(message.contains("params.width must be at least 1"));
    }

    #[test]
    fn test_non_numeric_params_rejected() {
        let mut event = full_event();
        event["input"]["params"]["duration_s"] = json!("five");

        let message = error_message(validate_event(event));
        assert_eq!(message, "params.duration_s must be an integer");
    }

    #[test]
    fn test_wrongly_typed_field_rejected() {
        let mut event = full_event();
        event["input"]["job_id"] = json!(42);

        let message = error_message(validate_event(event));
        assert!(message.starts_with("malformed job event"));
    }

    #[test]
    fn test_empty_secret_treated_as_absent() {
        let mut event = full_event();
        event["input"]["webhook"]["secret"] = json!("");
        assert!(validate_event(event).unwrap().webhook.secret.is_none());

        let mut event = full_event();
        event["input"]["webhook"]["secret"] = json!("s3cr3t");
        assert_eq!(
            validate_event(event).unwrap().webhook.secret.as_deref(),
            Some("s3cr3t")
        );
    }
}
