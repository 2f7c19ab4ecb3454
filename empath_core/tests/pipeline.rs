//! End-to-end: score maps in, recommendations and replies out.

use emotion_rules::{EmotionScoreMap, FusionPolicy, ProviderConfig};
use empath_core::{
    EmpathEngine, GenerationRequest, KnowledgeGraph, Recommender, RequestContext,
    ResponseDispatcher, ResponseSource, TechniqueId, TemplateCompositor, LITERAL_FALLBACK,
};
use rand::rngs::mock::StepRng;

fn ids(list: &[&str]) -> Vec<TechniqueId> {
    list.iter().map(|id| TechniqueId::from(*id)).collect()
}

#[test]
fn test_anger_scenario_end_to_end() {
    let graph = KnowledgeGraph::build_default();
    let emotions = EmotionScoreMap::new().with("anger", 0.9).with("neutral", 0.1);

    let techniques = Recommender::with_defaults().recommend(&graph, &emotions, 3);
    assert_eq!(
        techniques,
        ids(&["deep_breathing", "progressive_relaxation", "cognitive_reframing"])
    );

    let request = GenerationRequest::new("My boss yelled at me", emotions, techniques);
    let response = ResponseDispatcher::template_only().dispatch_with(&mut StepRng::new(0, 0), &request);

    assert_eq!(response.source, ResponseSource::Template);
    assert!(response.text.starts_with("I notice you seem frustrated right now."));
    assert!(response.text.contains("Deep Breathing"));
    assert!(response.text.contains("Additionally, "));
    assert!(response.text.contains("Progressive Muscle Relaxation"));
    assert!(!response.text.contains("Cognitive Reframing"));
}

#[test]
fn test_low_scores_fall_back_to_neutral() {
    let graph = KnowledgeGraph::build_default();
    let emotions = EmotionScoreMap::new().with("joy", 0.05).with("sadness", 0.08);

    assert_eq!(
        graph.recommend(&emotions, 3),
        ids(&["mindfulness", "gratitude", "positive_affirmation"])
    );
}

#[test]
fn test_unknown_labels_yield_nothing() {
    let graph = KnowledgeGraph::build_default();
    let emotions = EmotionScoreMap::new().with("boredom", 0.9);

    assert!(graph.recommend(&emotions, 3).is_empty());

    let text = TemplateCompositor::with_defaults().compose(&emotions, &[]);
    assert!(!text.is_empty());
}

#[test]
fn test_fused_audio_drives_recommendation() {
    let text = EmotionScoreMap::new().with("joy", 0.2);
    let audio = EmotionScoreMap::new().with("fear", 0.9);
    let fused = FusionPolicy::UnionSymmetric.fuse(&text, &audio);

    let graph = KnowledgeGraph::build_default();
    let techniques = graph.recommend(&fused, 1);
    assert_eq!(techniques, ids(&["deep_breathing"]));
}

#[test]
fn test_misconfigured_provider_still_replies() {
    for provider in ["openai", "together_ai", "huggingface", "google", "anthropic", "gpt-17"] {
        let engine = EmpathEngine::from_config(ProviderConfig::for_provider(provider, None));
        let reply = engine
            .respond_text(
                "I feel overwhelmed",
                &EmotionScoreMap::new().with("fear", 0.7),
                &RequestContext::default(),
            )
            .unwrap();

        assert!(matches!(reply.source, ResponseSource::TemplateFallback(_)));
        assert!(!reply.response_text.is_empty());
        assert_ne!(reply.response_text, LITERAL_FALLBACK);
    }
}

#[test]
fn test_ollama_unreachable_falls_back() {
    let config = ProviderConfig::for_provider("ollama", None)
        .with_endpoint("http://127.0.0.1:9/api/generate")
        .with_timeout(std::time::Duration::from_secs(2));
    let engine = EmpathEngine::from_config(config);

    let reply = engine.respond_audio(
        &EmotionScoreMap::new().with("sadness", 0.6),
        None,
        None,
        &RequestContext::default(),
    );
    assert_eq!(
        reply.source,
        ResponseSource::TemplateFallback("ollama".to_string())
    );
    assert!(!reply.response_text.is_empty());
}
