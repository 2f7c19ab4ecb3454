//! Graph snapshots and corpus files on disk.

use emotion_rules::EmotionScoreMap;
use empath_core::{
    EmpathEngine, GraphLoadError, KnowledgeGraph, RequestContext, TechniqueId, TechniqueRecord,
    TemplateCorpus,
};

#[test]
fn test_save_then_load_preserves_recommendations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("graph.json");

    let graph = KnowledgeGraph::build_default();
    assert!(graph.save(&path));

    let loaded = KnowledgeGraph::load(&path);
    assert_eq!(loaded.emotion_count(), graph.emotion_count());
    assert_eq!(loaded.technique_count(), graph.technique_count());
    assert_eq!(loaded.edge_count(), graph.edge_count());

    for emotions in [
        EmotionScoreMap::new().with("anger", 0.9),
        EmotionScoreMap::new().with("sadness", 0.9),
        EmotionScoreMap::new(),
    ] {
        assert_eq!(loaded.recommend(&emotions, 3), graph.recommend(&emotions, 3));
    }
    assert_eq!(
        loaded.recommend(&EmotionScoreMap::new().with("anger", 0.9), 3),
        vec![
            TechniqueId::from("deep_breathing"),
            TechniqueId::from("progressive_relaxation"),
            TechniqueId::from("cognitive_reframing"),
        ]
    );
}

#[test]
fn test_corrupt_snapshot_loads_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        KnowledgeGraph::try_load(&path),
        Err(GraphLoadError::Parse(_))
    ));
    let graph = KnowledgeGraph::load(&path);
    assert_eq!(graph.technique_count(), 10);
}

#[test]
fn test_missing_snapshot_loads_default() {
    let dir = tempfile::tempdir().unwrap();
    let graph = KnowledgeGraph::load(dir.path().join("absent.json"));
    assert_eq!(graph.emotion_count(), 12);
}

#[test]
fn test_engine_reload_swaps_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.json");

    let mut custom = KnowledgeGraph::new();
    custom.add_emotion("anger");
    custom.add_technique(TechniqueRecord::new("cold_water", "Cold Water", "Splash your face."));
    custom.add_edge("anger", &TechniqueId::from("cold_water"), 0.9);
    assert!(custom.save(&path));

    let engine = EmpathEngine::with_defaults();
    let emotions = EmotionScoreMap::new().with("anger", 0.9);
    assert_eq!(engine.recommend(&emotions, 1), vec![TechniqueId::from("deep_breathing")]);

    engine.load_graph(&path);
    assert_eq!(engine.recommend(&emotions, 3), vec![TechniqueId::from("cold_water")]);

    let reply = engine
        .respond_text("so angry", &emotions, &RequestContext::default())
        .unwrap();
    assert!(reply.response_text.contains("Cold Water"));

    let copy = dir.path().join("copy.json");
    assert!(engine.save_graph(&copy));
    assert_eq!(KnowledgeGraph::load(&copy).technique_count(), 1);
}

#[test]
fn test_custom_corpus_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templates.json");

    let mut corpus = TemplateCorpus::builtin();
    corpus.follow_up = vec!["Want to try it now?".to_string()];
    std::fs::write(&path, serde_json::to_string_pretty(&corpus).unwrap()).unwrap();

    let loaded = TemplateCorpus::load(&path);
    assert_eq!(loaded.follow_up, vec!["Want to try it now?".to_string()]);
}
