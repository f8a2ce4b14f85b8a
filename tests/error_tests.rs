use axum::http::StatusCode;
use sprig::error::SprigError;

#[test]
fn status_codes_are_correct() {
    assert_eq!(SprigError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(SprigError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        SprigError::Validation("bad care type".into()).status_code(),
        StatusCode::BAD_REQUEST,
    );
    assert_eq!(
        SprigError::PhotoProcessing("bad magic".into()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    assert_eq!(
        SprigError::AiBackend("timeout".into()).status_code(),
        StatusCode::BAD_GATEWAY,
    );
    assert_eq!(
        SprigError::Internal("oops".into()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR,
    );
}

#[test]
fn error_messages_are_human_readable() {
    assert_eq!(SprigError::NotFound.to_string(), "not found");
    assert!(SprigError::Validation("bad tag".into()).to_string().contains("bad tag"));
    assert!(SprigError::PhotoProcessing("truncated".into())
        .to_string()
        .contains("photo processing failed"));
}

#[test]
fn into_response_has_json_body() {
    use axum::response::IntoResponse;
    let resp = SprigError::NotFound.into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
