/*!
 * Tests for the annotation generator
 */

use std::sync::Arc;
use subnotes::annotation::{Annotation, AnnotationGenerator, AnnotationOptions, CategoryVocabulary};
use subnotes::app_config::{Config, ProviderConfig, ProviderKind};
use subnotes::errors::AnnotationError;
use subnotes::providers::mock::MockProvider;

use crate::common;

fn generator(provider: &MockProvider) -> AnnotationGenerator {
    AnnotationGenerator::new(
        Arc::new(provider.clone()),
        CategoryVocabulary::default(),
        "Russian",
        AnnotationOptions::default(),
    )
}

/// Test the note and category produced for a culturally specific line
#[tokio::test]
async fn test_annotate_withReference_shouldReturnCleanNoteAndLabel() {
    let provider = common::annotating_provider();
    let annotation = generator(&provider).annotate("TechCrunch Disrupt is happening").await;

    assert_eq!(
        annotation,
        Annotation::Noted {
            note: "a startup conference reference".to_string(),
            category: "event".to_string(),
        }
    );
    assert_eq!(provider.request_count(), 2);
}

/// Test that a plain line costs one request and yields no note
#[tokio::test]
async fn test_annotate_withPlainLine_shouldNotClassify() {
    let provider = common::annotating_provider();
    let annotation = generator(&provider).annotate("Hello.").await;

    assert_eq!(annotation, Annotation::NotNeeded);
    assert_eq!(provider.request_count(), 1);
}

/// Test that an empty reply counts as no note
#[test]
fn test_annotate_withEmptyReply_shouldReturnNotNeeded() {
    let provider = MockProvider::empty();
    let annotation = tokio_test::block_on(generator(&provider).annotate("Hello."));
    assert_eq!(annotation, Annotation::NotNeeded);
    assert_eq!(provider.request_count(), 1);
}

/// Test that failures become error records with the Error category
#[tokio::test]
async fn test_annotate_withFailingProvider_shouldReturnFailedRecord() {
    let provider = MockProvider::failing();
    let annotation = generator(&provider).annotate("TechCrunch").await;

    assert!(matches!(annotation, Annotation::Failed(AnnotationError::Extraction(_))));
    assert_eq!(annotation.category_label(), "Error");
    assert!(annotation.note_text().contains("Simulated provider failure"));
}

/// Test that the target language code is resolved into the prompt
#[tokio::test]
async fn test_from_config_shouldUseResolvedLanguageAndModel() {
    let mut config = Config::default();
    config.target_language = "de".to_string();
    config.provider = ProviderConfig::new(ProviderKind::LMStudio);
    config.provider.model = "my-model".to_string();
    let provider = MockProvider::scripted(|_| Ok("-".to_string()));

    let generator = AnnotationGenerator::from_config(Arc::new(provider.clone()), &config).unwrap();
    generator.annotate("Guten Tag").await;

    let request = &provider.requests()[0];
    assert_eq!(request.model, "my-model");
    assert!(request.prompt.contains("concise explanation in German"));
}

/// Test that an unresolvable language is rejected
#[test]
fn test_from_config_withUnknownLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "xx".to_string();
    let result = AnnotationGenerator::from_config(Arc::new(MockProvider::working()), &config);
    assert!(result.is_err());
}
