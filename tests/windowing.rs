use lexsub::core::SubstituteError;
use lexsub::data::{Document, DocumentId, Occurrence};
use lexsub::pipelines::substitution::ContextWindower;

fn document(tokens: &[&str]) -> Document {
    Document {
        id: DocumentId::Int(7),
        tokens: tokens.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn window_is_truncated_on_both_sides() -> anyhow::Result<()> {
    let tokens: Vec<String> = (0..10).map(|i| format!("w{i}")).collect();
    let doc = Document {
        id: DocumentId::Int(7),
        tokens,
    };
    let windower = ContextWindower::new(2, "[MASK]");

    let instance = windower.window(&doc, &Occurrence::new(7i64, 5))?;
    assert_eq!(instance.left(), ["w3", "w4"]);
    assert_eq!(instance.right(), ["w6", "w7"]);
    assert_eq!(instance.sequence(), ["w3", "w4", "[MASK]", "w6", "w7"]);
    assert_eq!(instance.mask_position(), instance.left().len());
    assert_eq!(instance.target, "w5");
    assert_eq!(instance.token_index, 5);
    Ok(())
}

#[test]
fn target_at_document_edges() -> anyhow::Result<()> {
    let doc = document(&["the", "cat", "sat"]);
    let windower = ContextWindower::new(50, "[MASK]");

    let first = windower.window(&doc, &Occurrence::new(7i64, 0))?;
    assert_eq!(first.mask_position(), 0);
    assert_eq!(first.sequence(), ["[MASK]", "cat", "sat"]);

    let last = windower.window(&doc, &Occurrence::new(7i64, 2))?;
    assert_eq!(last.mask_position(), 2);
    assert!(last.right().is_empty());
    Ok(())
}

#[test]
fn truncation_counts_word_pieces() -> anyhow::Result<()> {
    let doc = document(&["re##play", "the", "game##s"]);
    let windower = ContextWindower::new(1, "[MASK]");

    let instance = windower.window(&doc, &Occurrence::new(7i64, 1))?;
    assert_eq!(instance.sequence(), ["##play", "[MASK]", "game"]);
    assert_eq!(instance.mask_position(), 1);
    Ok(())
}

#[test]
fn window_never_exceeds_radius() -> anyhow::Result<()> {
    let tokens: Vec<String> = (0..40).map(|i| format!("t{i}##x")).collect();
    let doc = Document {
        id: DocumentId::Int(7),
        tokens,
    };
    for radius in [0, 1, 3, 17, 100] {
        let windower = ContextWindower::new(radius, "[MASK]");
        for index in 0..40 {
            let instance = windower.window(&doc, &Occurrence::new(7i64, index))?;
            assert!(instance.left().len() <= radius);
            assert!(instance.right().len() <= radius);
            assert_eq!(instance.mask_position(), instance.left().len());
            assert_eq!(instance.sequence()[instance.mask_position()], "[MASK]");
        }
    }
    Ok(())
}

#[test]
fn out_of_range_index_is_rejected() {
    let doc = document(&["the", "cat"]);
    let windower = ContextWindower::new(5, "[MASK]");
    let result = windower.window(&doc, &Occurrence::new(7i64, 2));
    assert!(matches!(
        result,
        Err(SubstituteError::TokenIndexOutOfRange { index: 2, len: 2, .. })
    ));
}
