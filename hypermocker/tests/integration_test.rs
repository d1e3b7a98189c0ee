use hypermocker::{Mock, StatusCode};

#[tokio::test]
async fn anticipated_request_is_answered() {
    let _ = env_logger::try_init();

    let mock = Mock::bind().await;
    mock.anticipate("/lake.geojson").respond("hello");

    let response = reqwest::get(mock.url("/lake.geojson?v=1")).await.unwrap();
    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(&response.bytes().await.unwrap()[..], b"hello");

    assert_eq!(vec!["/lake.geojson?v=1".to_owned()], mock.received());
}

#[tokio::test]
async fn request_waits_for_the_response() {
    let _ = env_logger::try_init();

    let mock = Mock::bind().await;
    let request = mock.anticipate("/slow");
    let url = mock.url("/slow");

    let (response, ()) = tokio::join!(
        async { reqwest::get(url).await.unwrap().bytes().await.unwrap() },
        async {
            tokio::task::yield_now().await;
            request.respond("finally");
        },
    );
    assert_eq!(&response[..], b"finally");
}

#[tokio::test]
async fn responding_with_status() {
    let _ = env_logger::try_init();

    let mock = Mock::bind().await;
    mock.anticipate("/missing")
        .respond_with_status(StatusCode::NOT_FOUND);

    let response = reqwest::get(mock.url("/missing")).await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[tokio::test]
#[should_panic(expected = "there were unexpected requests")]
async fn unexpected_request() {
    let _ = env_logger::try_init();

    let mock = Mock::bind().await;

    let response = reqwest::get(mock.url("/foo")).await.unwrap();
    assert_eq!(StatusCode::IM_A_TEAPOT, response.status());
    assert_eq!(&response.bytes().await.unwrap()[..], b"unexpected");
}
