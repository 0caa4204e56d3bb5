use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ThenNowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ThenNowError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        ThenNowError::storage("x")
            .to_string()
            .contains("storage error:")
    );
    assert!(
        ThenNowError::quota_exceeded("x")
            .to_string()
            .contains("storage quota exceeded:")
    );
    assert!(
        ThenNowError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        ThenNowError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("disk gone");
    let err = ThenNowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("disk gone"));
}

#[test]
fn anyhow_converts_via_question_mark() {
    fn inner() -> ThenNowResult<()> {
        Err(anyhow::anyhow!("ctx"))?;
        Ok(())
    }
    assert!(matches!(inner(), Err(ThenNowError::Other(_))));
}
