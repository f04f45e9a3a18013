//! Output history tests: versioning, activation, supersede semantics

use markweave::model::{Format, OutputHistory};

#[test]
fn test_push_activates_the_new_output() {
    let mut history = OutputHistory::new();
    let first = history.push(Format::StaticHtml, "<p>1</p>".to_string());
    let second = history.push(Format::VueSfc, "<template/>".to_string());

    assert_ne!(first, second);
    assert_eq!(history.active_id(), Some(second));
    assert_eq!(history.len(), 2);
}

#[test]
fn test_supersede_bumps_revision_and_timestamp_forward() {
    let mut history = OutputHistory::new();
    history.push(Format::StaticHtml, "<p>old</p>".to_string());
    let before = history.active().unwrap().timestamp;

    assert!(history.supersede_active("<p>new</p>".to_string()));
    let output = history.active().unwrap();
    assert_eq!(output.code, "<p>new</p>");
    assert_eq!(output.revision, 1);
    assert!(output.timestamp >= before);
}

#[test]
fn test_supersede_without_an_active_output_is_refused() {
    let mut history = OutputHistory::new();
    assert!(!history.supersede_active("<p>x</p>".to_string()));
}

#[test]
fn test_delete_refuses_the_last_version() {
    let mut history = OutputHistory::new();
    let id = history.push(Format::StaticHtml, "<p>x</p>".to_string());
    assert!(!history.delete(id));
    assert_eq!(history.len(), 1);
}

#[test]
fn test_deleting_the_active_version_activates_the_newest_remaining() {
    let mut history = OutputHistory::new();
    let first = history.push(Format::StaticHtml, "<p>1</p>".to_string());
    let second = history.push(Format::StaticHtml, "<p>2</p>".to_string());
    let third = history.push(Format::StaticHtml, "<p>3</p>".to_string());

    // Make an older version active, then delete it
    assert!(history.select(first));
    assert!(history.delete(first));

    let active = history.active_id();
    assert!(active == Some(second) || active == Some(third));
    // Newest remaining wins the tie on timestamp via the higher id
    assert_eq!(active, Some(third));
}

#[test]
fn test_deleting_an_inactive_version_keeps_the_active_one() {
    let mut history = OutputHistory::new();
    let first = history.push(Format::StaticHtml, "<p>1</p>".to_string());
    let second = history.push(Format::StaticHtml, "<p>2</p>".to_string());

    assert!(history.delete(first));
    assert_eq!(history.active_id(), Some(second));
}

#[test]
fn test_select_unknown_id_is_refused() {
    let mut history = OutputHistory::new();
    let id = history.push(Format::StaticHtml, "<p>x</p>".to_string());
    assert!(!history.delete(markweave::model::OutputId(id.0 + 99)));
    assert!(!history.select(markweave::model::OutputId(id.0 + 99)));
    assert_eq!(history.active_id(), Some(id));
}

#[test]
fn test_by_format_groups_newest_first() {
    let mut history = OutputHistory::new();
    history.push(Format::StaticHtml, "<p>a</p>".to_string());
    history.push(Format::ReactComponent, "const A = 1".to_string());
    history.push(Format::StaticHtml, "<p>b</p>".to_string());

    let html = history.by_format(Format::StaticHtml);
    assert_eq!(html.len(), 2);
    assert_eq!(html[0].code, "<p>b</p>");
    assert_eq!(html[1].code, "<p>a</p>");

    assert_eq!(history.formats().len(), 2);
    assert!(history.by_format(Format::VueSfc).is_empty());
}
