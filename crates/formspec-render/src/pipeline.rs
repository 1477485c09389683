//! validate → strict gate → render → post-process

use chrono::{DateTime, Utc};
use formspec_core::{parse, validate, ValidationOptions, ValidationReport};
use formspec_reconcile::extract_fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::engine::EngineKind;
use crate::error::GenerateError;
use crate::fonts::FontAvailability;
use crate::log::RenderLogEntry;
use crate::postprocess::force_manual_appearance_regeneration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub validation: ValidationOptions,
    pub engine: EngineKind,
    /// Refuse to render when validation produced any warning
    pub strict: bool,
    /// Run the post-processor that sets `/NeedAppearances`
    pub need_appearances: bool,
    /// `CreationDate` override; the clock is read when absent
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            validation: ValidationOptions::default(),
            engine: EngineKind::default(),
            strict: false,
            need_appearances: true,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub pdf: Vec<u8>,
    pub log: Vec<RenderLogEntry>,
    pub validation: ValidationReport,
    pub engine: EngineKind,
    pub need_appearances_set: bool,
    /// AcroForm fields read back from `pdf`
    pub field_count: usize,
}

#[derive(Debug, Clone)]
pub enum GenerateOutcome {
    Rendered(GeneratedPdf),
    /// Validation blocked generation; nothing was rendered
    Rejected(ValidationReport),
}

/// Validate `spec` and, when it passes the gate, render it with the chosen engine.
pub fn generate(
    spec: &Value,
    options: &GenerateOptions,
    fonts: &dyn FontAvailability,
) -> Result<GenerateOutcome, GenerateError> {
    let report = validate(spec, &options.validation);
    if report.blocks_generation(options.strict) {
        warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            strict = options.strict,
            "generation rejected by validation"
        );
        return Ok(GenerateOutcome::Rejected(report));
    }
    let Some(normalized) = report.normalized.as_ref() else {
        return Ok(GenerateOutcome::Rejected(report));
    };

    let engine = options.engine.engine(options.created_at);
    let rendered = engine.render(normalized, fonts)?;
    let mut log = rendered.log;

    let (pdf, need_appearances_set) = if options.need_appearances {
        force_manual_appearance_regeneration(&rendered.pdf)
    } else {
        (rendered.pdf, false)
    };
    if need_appearances_set {
        log.push(RenderLogEntry {
            page: None,
            element: None,
            message: "postprocess: set /NeedAppearances true".to_string(),
        });
    }

    let field_count = match extract_fields(&pdf) {
        Ok(extracted) => extracted.names.len(),
        Err(err) => {
            warn!("could not read back generated fields: {err}");
            0
        }
    };

    info!(
        engine = %options.engine,
        bytes = pdf.len(),
        fields = field_count,
        "generated form"
    );
    Ok(GenerateOutcome::Rendered(GeneratedPdf {
        pdf,
        log,
        validation: report,
        engine: options.engine,
        need_appearances_set,
        field_count,
    }))
}

/// [`generate`] from raw YAML/JSON text, optionally fenced in Markdown
pub fn generate_from_text(
    text: &str,
    options: &GenerateOptions,
    fonts: &dyn FontAvailability,
) -> Result<GenerateOutcome, GenerateError> {
    let spec = parse(text)?;
    generate(&Value::Object(spec), options, fonts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontLibrary;
    use formspec_core::sample::DEFAULT_SPEC_MARKDOWN;
    use formspec_core::SpecError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rendered(outcome: GenerateOutcome) -> GeneratedPdf {
        match outcome {
            GenerateOutcome::Rendered(generated) => generated,
            GenerateOutcome::Rejected(report) => panic!("rejected: {:?}", report.errors),
        }
    }

    #[test]
    fn test_sample_generates_with_both_engines() {
        for engine in EngineKind::ALL {
            let options = GenerateOptions {
                engine,
                ..Default::default()
            };
            let generated =
                rendered(generate_from_text(DEFAULT_SPEC_MARKDOWN, &options, &FontLibrary::new()).unwrap());
            assert_eq!(generated.engine, engine);
            assert_eq!(generated.field_count, 4);
            assert!(generated.need_appearances_set);
            assert_eq!(
                generated.log.last().map(|entry| entry.message.as_str()),
                Some("postprocess: set /NeedAppearances true")
            );
        }
    }

    #[test]
    fn test_post_processing_can_be_disabled() {
        let options = GenerateOptions {
            need_appearances: false,
            ..Default::default()
        };
        let generated =
            rendered(generate_from_text(DEFAULT_SPEC_MARKDOWN, &options, &FontLibrary::new()).unwrap());
        assert!(!generated.need_appearances_set);
        assert!(!generated.log.iter().any(|entry| entry.message.starts_with("postprocess")));
    }

    #[test]
    fn test_fatal_error_rejects() {
        let spec = json!({"pages": [{"elements": [
            {"type": "field", "id": "ok", "field_type": "text", "x": 1, "y": 1, "w": 10, "h": 5},
            {"type": "field", "id": "broken", "field_type": "text", "y": 1, "w": 10, "h": 5},
        ]}]});
        let outcome = generate(&spec, &GenerateOptions::default(), &FontLibrary::new()).unwrap();
        let GenerateOutcome::Rejected(report) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(report.errors, vec!["Page 1 element 2: missing numeric x/y.".to_string()]);
    }

    #[test]
    fn test_strict_mode_rejects_warnings() {
        let spec = json!({"pages": [{"elements": [
            {"type": "field", "id": "sig", "field_type": "signature", "x": 1, "y": 1, "w": 10, "h": 5},
        ]}]});
        let lenient = generate(&spec, &GenerateOptions::default(), &FontLibrary::new()).unwrap();
        let generated = rendered(lenient);
        assert!(generated
            .log
            .iter()
            .any(|entry| entry.message.ends_with("fallback field type 'signature' -> text for sig")));

        let strict = GenerateOptions {
            strict: true,
            ..Default::default()
        };
        let outcome = generate(&spec, &strict, &FontLibrary::new()).unwrap();
        assert!(matches!(outcome, GenerateOutcome::Rejected(ref report) if report.errors.is_empty()));
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let err = generate_from_text("   ", &GenerateOptions::default(), &FontLibrary::new()).unwrap_err();
        assert!(matches!(err, GenerateError::Spec(SpecError::EmptySpec)));
    }

    #[test]
    fn test_options_from_toml_like_json() {
        let options: GenerateOptions = serde_json::from_value(json!({"engine": "vector", "strict": true})).unwrap();
        assert_eq!(options.engine, EngineKind::Vector);
        assert!(options.strict);
        assert!(options.need_appearances);
    }
}
