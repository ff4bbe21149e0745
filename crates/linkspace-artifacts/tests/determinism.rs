//! Rendering must be a pure function of the document

use linkspace_artifacts::{
    ArtifactBuilder, ArtifactError, Background, Document, Item, ItemContent, ItemStyle, Shape,
};

fn sample() -> Document {
    let mut doc = Document::starter("Ada Lovelace");
    doc.profile.avatar_url = "https://img.example/ada.png".into();
    doc.items.push(
        Item::new(
            "gif",
            ItemContent::Embed {
                url: "https://tenor.com/view/party-gif-1234567".into(),
            },
        )
        .with_style(ItemStyle::default().with_shape(Shape::Square)),
    );
    doc.background = Background::Color("#000".into());
    doc
}

#[test]
fn test_equal_documents_render_identically() {
    let builder = ArtifactBuilder::new();
    let a = builder.build(&sample());
    let b = builder.build(&sample().clone());
    assert_eq!(a.as_bytes(), b.as_bytes());
    assert_eq!(a.content_id(), b.content_id());
}

#[test]
fn test_any_change_changes_digest() {
    let builder = ArtifactBuilder::new();
    let base = builder.build(&sample());

    let mut reordered = sample();
    reordered.items.swap(0, 1);
    assert_ne!(builder.build(&reordered).digest(), base.digest());

    let mut renamed = sample();
    renamed.profile.bio.push('!');
    assert_ne!(builder.build(&renamed).digest(), base.digest());
}

#[test]
fn test_snapshot_and_typed_document_agree() {
    let snapshot = r##"{
        "name": "Ada",
        "bio": "Analyst",
        "profileImage": "",
        "bgType": "color",
        "bgColor": "#F3E8FF",
        "items": [
            {"id": "1", "type": "text", "content": {"text": "hello"},
             "bgColor": "#F0F0F0", "textColor": "#000000", "width": 1, "height": 1, "shape": "rounded"}
        ]
    }"##;

    let typed = Document {
        profile: linkspace_artifacts::Profile {
            name: "Ada".into(),
            bio: "Analyst".into(),
            avatar_url: String::new(),
        },
        items: vec![Item::new("1", ItemContent::Text { text: "hello".into() })],
        background: Background::Color("#F3E8FF".into()),
    };

    let builder = ArtifactBuilder::new();
    let from_snapshot = builder.build_snapshot(snapshot).unwrap();
    assert_eq!(from_snapshot.as_bytes(), builder.build(&typed).as_bytes());
}

#[test]
fn test_snapshot_with_unknown_item_fails_whole_build() {
    let snapshot = r#"{"items": [
        {"id": "1", "type": "text", "content": {"text": "ok"}},
        {"id": "2", "type": "poll", "content": {}}
    ]}"#;
    let err = ArtifactBuilder::new().build_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, ArtifactError::UnsupportedItem { ref tag, .. } if tag == "poll"));
    assert!(format!("{}", err).contains("poll"));
}

#[test]
fn test_tenor_item_renders_iframe() {
    let artifact = ArtifactBuilder::new().build(&sample());
    let html = artifact.as_str().unwrap();
    assert!(html.contains("data-postid=\"1234567\""));
    assert!(html.contains("https://tenor.com/embed/1234567?autoplay=1"));
}
