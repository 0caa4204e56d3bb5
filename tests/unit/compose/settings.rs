use super::*;

#[test]
fn defaults_match_first_run() {
    let s = Settings::default();
    assert_eq!(s.aspect_ratio, AspectRatio::Auto);
    assert_eq!(s.before_label, "Before");
    assert_eq!(s.after_label, "After");
    assert_eq!(s.arrow_style, ArrowStyle::Classic);
    assert_eq!(s.arrow_color, ArrowColor::White);
}

#[test]
fn persisted_schema_round_trips() {
    let s = Settings {
        aspect_ratio: AspectRatio::Portrait9x16,
        before_label: "2019".into(),
        after_label: "2024".into(),
        arrow_style: ArrowStyle::Minimal,
        arrow_color: ArrowColor::Red,
    };
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["aspectRatio"], "9:16");
    assert_eq!(json["beforeLabel"], "2019");
    assert_eq!(json["arrowStyle"], "minimal");
    assert_eq!(json["arrowColor"], "red");
    let back: Settings = serde_json::from_value(json).unwrap();
    assert_eq!(back, s);
}

#[test]
fn unknown_values_fall_back_per_field() {
    let json = r#"{"aspectRatio":"5:1","beforeLabel":"Old","arrowStyle":"fancy","arrowColor":"black"}"#;
    let s: Settings = serde_json::from_str(json).unwrap();
    assert_eq!(s.aspect_ratio, AspectRatio::Auto);
    assert_eq!(s.before_label, "Old");
    assert_eq!(s.after_label, "After");
    assert_eq!(s.arrow_style, ArrowStyle::Classic);
    assert_eq!(s.arrow_color, ArrowColor::Black);
}

#[test]
fn wrongly_typed_values_keep_the_rest_of_the_record() {
    let json = r#"{"aspectRatio":5,"beforeLabel":"Then","arrowStyle":null,"arrowColor":["red"]}"#;
    let s: Settings = serde_json::from_str(json).unwrap();
    assert_eq!(s.aspect_ratio, AspectRatio::Auto);
    assert_eq!(s.before_label, "Then");
    assert_eq!(s.arrow_style, ArrowStyle::Classic);
    assert_eq!(s.arrow_color, ArrowColor::White);
}

#[test]
fn parse_from_cli_strings() {
    assert_eq!("21:9".parse::<AspectRatio>().unwrap(), AspectRatio::Ultrawide21x9);
    assert_eq!("Modern".parse::<ArrowStyle>().unwrap(), ArrowStyle::Modern);
    assert_eq!(" RED ".parse::<ArrowColor>().unwrap(), ArrowColor::Red);
    assert!("2:1".parse::<AspectRatio>().is_err());
}

#[test]
fn arrow_colors_are_exact() {
    assert_eq!(ArrowColor::White.rgba().to_hex(), "#ffffff");
    assert_eq!(ArrowColor::Black.rgba().to_hex(), "#000000");
    assert_eq!(ArrowColor::Red.rgba().to_hex(), "#ef4444");
}

#[test]
fn ratio_terms() {
    assert_eq!(AspectRatio::Auto.terms(), None);
    assert_eq!(AspectRatio::Landscape4x3.terms(), Some((4, 3)));
    assert_eq!(AspectRatio::Portrait3x4.to_string(), "3:4");
}
