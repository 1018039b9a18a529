use super::*;
use proptest::prelude::*;

const SECRET: Option<&str> = Some("abc123");

#[test]
fn test_classify_with_secret() {
    assert_eq!(
        classify("/call/abc123/keepalive/1", SECRET),
        Route::Call("keepalive/1")
    );
    assert_eq!(
        classify("/abc123/slfsrv-core.js", SECRET),
        Route::Bootstrap
    );
    assert_eq!(classify("/abc123/", SECRET), Route::Content(""));
    assert_eq!(
        classify("/abc123/img/logo.png", SECRET),
        Route::Content("img/logo.png")
    );
    assert_eq!(classify("/abc123", SECRET), Route::SecretRoot);
}

#[test]
fn test_classify_rejects_without_secret_prefix() {
    for path in [
        "/",
        "/xyz/",
        "/index.html",
        "/slfsrv-core.js",
        "/call/keepalive/1",
        "/call/wrong/keepalive/1",
        "/call/abc123",
        "/abc1234/index.html",
        "abc123/index.html",
    ] {
        assert_eq!(classify(path, SECRET), Route::Rejected, "{}", path);
    }
}

#[test]
fn test_classify_without_secret() {
    assert_eq!(
        classify("/call/store_get/5", None),
        Route::Call("store_get/5")
    );
    assert_eq!(classify("/slfsrv-core.js", None), Route::Bootstrap);
    assert_eq!(classify("/", None), Route::Content(""));
    assert_eq!(
        classify("/docs/readme.txt", None),
        Route::Content("docs/readme.txt")
    );
}

#[test]
fn test_wants_download() {
    assert!(wants_download(Some("dl")));
    assert!(wants_download(Some("v=2&dl=1")));
    assert!(!wants_download(Some("download")));
    assert!(!wants_download(None));
}

#[test]
fn test_redirect_encodes_location() {
    let response = redirect("/abc123/my docs/", Some("x=1"));
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/abc123/my%20docs/?x=1"
    );

    let response = redirect("/abc123/caf\u{e9}/", None);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/abc123/caf%C3%A9/"
    );
}

proptest! {
    #[test]
    fn prop_unprefixed_paths_rejected(segment in "[a-zA-Z0-9._-]{0,12}", rest in "[a-z/]{0,20}") {
        prop_assume!(segment != "abc123" && segment != "call");
        let path = format!("/{}/{}", segment, rest);
        prop_assert_eq!(classify(&path, SECRET), Route::Rejected);
    }

    #[test]
    fn prop_prefixed_content_keeps_logical_path(rest in "[a-z0-9/._-]{0,30}") {
        prop_assume!(rest != "slfsrv-core.js");
        let path = format!("/abc123/{}", rest);
        prop_assert_eq!(classify(&path, SECRET), Route::Content(rest.as_str()));
    }
}
