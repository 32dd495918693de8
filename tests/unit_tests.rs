//! Public API tests for objstore-bridge
//!
//! HTTP behaviour is checked against local mockito servers; nothing here
//! needs a running storage service.

use objstore_bridge::backends::labstore;
use objstore_bridge::{
    encode_key, ByteRange, Credentials, Error, HmacSigner, ObjectStorage, Registry, RequestSpec,
    RestfulStorage, Result, StorageConfig,
};
use mockito::{Matcher, Server};
use reqwest::header::HeaderValue;
use reqwest::{Method, Request, StatusCode};
use std::sync::Arc;

// =============================================================================
// Registry
// =============================================================================

mod registry_tests {
    use super::*;

    fn fixed_endpoint(_: &str, ak: &str, sk: &str, token: &str) -> Result<Box<dyn ObjectStorage>> {
        labstore::construct("https://store.example/objects", ak, sk, token)
    }

    #[test]
    fn test_register_custom_backend() {
        let mut registry = Registry::with_builtin().unwrap();
        registry.register("x", fixed_endpoint).unwrap();

        let storage = registry.construct("x", "ignored", "", "tok", "").unwrap();
        assert_eq!(storage.describe(), "labstore://store.example/");
    }

    #[test]
    fn test_register_builtin_twice() {
        let mut registry = Registry::with_builtin().unwrap();
        let err = registry.register("labstore", fixed_endpoint).unwrap_err();
        assert!(matches!(err, Error::DuplicateBackend(_)));
    }

    #[test]
    fn test_construct_unregistered() {
        let registry = Registry::new();
        let err = registry.construct("labstore", "h", "", "", "").unwrap_err();
        assert_eq!(err.to_string(), "unknown backend: labstore");
    }

    #[test]
    fn test_construction_is_offline() {
        // Nothing listens on this address; construction must still succeed.
        let registry = Registry::with_builtin().unwrap();
        assert!(registry.construct("labstore", "192.0.2.1:1", "", "", "").is_ok());
    }
}

// =============================================================================
// Endpoint normalization
// =============================================================================

mod endpoint_tests {
    use super::*;

    #[test]
    fn test_bare_endpoints_expanded() {
        for host in ["store.example", "10.0.0.7", "10.0.0.7:8443", "[::1]:9000"] {
            let store = labstore::LabStore::new(host, "", "", "").unwrap();
            assert_eq!(store.endpoint(), format!("https://{}/objects", host));
        }
    }

    #[test]
    fn test_absolute_endpoints_unchanged() {
        for url in [
            "http://store.example/objects",
            "https://store.example/v2/blobs",
            "https://store.example",
            "https://Store.Example:443/objects/",
        ] {
            let store = labstore::LabStore::new(url, "", "", "").unwrap();
            assert_eq!(store.endpoint(), url);
        }
    }
}

// =============================================================================
// LabStore put protocol
// =============================================================================

mod put_tests {
    use super::*;

    #[tokio::test]
    async fn test_put_scenario() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/objects/a/b.txt")
            .match_header("content-length", "5")
            .match_header("x-labstore-sha256", labstore::content_digest(b"hello").as_str())
            .match_header("x-labstore-configid", "default")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .create_async()
            .await;

        let mut registry = Registry::new();
        registry.register("x", labstore::construct).unwrap();
        let storage = registry
            .construct("x", &format!("{}/objects", server.url()), "ak", "secret", "")
            .unwrap();

        storage.put("a/b.txt", &mut &b"hello"[..]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_digest_tracks_body() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("PUT", "/objects/k")
            .match_header("x-labstore-sha256", labstore::content_digest(b"aaaa").as_str())
            .match_header("content-length", "4")
            .with_status(200)
            .create_async()
            .await;
        let second = server
            .mock("PUT", "/objects/k")
            .match_header("x-labstore-sha256", labstore::content_digest(b"aaab").as_str())
            .match_header("content-length", "4")
            .with_status(200)
            .create_async()
            .await;

        let storage =
            labstore::construct(&format!("{}/objects", server.url()), "", "", "").unwrap();
        storage.put("k", &mut &b"aaaa"[..]).await.unwrap();
        storage.put("k", &mut &b"aaab"[..]).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_large_body_length() {
        let body = vec![7u8; 256 * 1024];
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/objects/big")
            .match_header("content-length", "262144")
            .match_header("x-labstore-sha256", labstore::content_digest(&body).as_str())
            .with_status(200)
            .create_async()
            .await;

        let storage =
            labstore::construct(&format!("{}/objects", server.url()), "", "", "").unwrap();
        storage.put("big", &mut &body[..]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_storage_class_through_config() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/objects/k")
            .match_header("x-labstore-configid", "cold")
            .with_status(200)
            .create_async()
            .await;

        let config = StorageConfig {
            backend: "labstore".to_string(),
            endpoint: format!("{}/objects", server.url()),
            secret_key: "tok".to_string(),
            storage_class: Some("cold".to_string()),
            ..Default::default()
        };
        let storage = Registry::with_builtin().unwrap().open(&config).unwrap();
        storage.put("k", &mut &b"z"[..]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_structured() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/objects/k")
            .with_status(503)
            .with_body(r#"{"kind":"Overloaded","message":"try later","retryable":true}"#)
            .create_async()
            .await;

        let storage =
            labstore::construct(&format!("{}/objects", server.url()), "", "", "").unwrap();
        let err = storage.put("k", &mut &b"z"[..]).await.unwrap_err();
        assert!(err.is_retryable());
        match err {
            Error::Backend(e) => {
                assert_eq!(e.status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(e.kind, "Overloaded");
                assert_eq!(e.message, "try later");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }
}

// =============================================================================
// Capabilities
// =============================================================================

mod capability_tests {
    use super::*;

    #[test]
    fn test_list_not_supported() {
        let registry = Registry::with_builtin().unwrap();
        for (name, endpoint) in [
            ("labstore", "store.example"),
            ("restful", "https://store.example/data"),
        ] {
            let storage = registry.construct(name, endpoint, "", "", "").unwrap();
            let err = tokio_test::block_on(storage.list(Default::default())).unwrap_err();
            assert!(err.is_not_supported(), "{}: {:?}", name, err);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_storage_class_capability_detection() {
        let registry = Registry::with_builtin().unwrap();
        let lab = registry.construct("labstore", "h", "", "", "").unwrap();
        let rest = registry
            .construct("restful", "https://h/data", "", "", "")
            .unwrap();
        assert!(lab.as_storage_class().is_some());
        assert!(rest.as_storage_class().is_none());
    }
}

// =============================================================================
// Executor and signing
// =============================================================================

mod executor_tests {
    use super::*;

    #[tokio::test]
    async fn test_custom_signer_closure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/k")
            .match_header("x-api-key", "ak/SIG")
            .with_status(200)
            .create_async()
            .await;

        let signer = |req: &mut Request, ak: &str, _sk: &str, name: &str| -> Result<()> {
            let value: HeaderValue = format!("{}/{}", ak, name)
                .parse()
                .map_err(|_| Error::Signing("bad key".to_string()))?;
            req.headers_mut().insert("x-api-key", value);
            Ok(())
        };
        let storage = RestfulStorage::new(
            &format!("{}/v1", server.url()),
            Credentials::new("ak", "sk", ""),
            "SIG",
            Arc::new(signer),
        )
        .unwrap();

        let response = storage.execute(RequestSpec::new(Method::GET, "k")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_hmac_signed_delete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/data/dir/file%20one")
            .match_header("authorization", Matcher::Regex("^RESTFUL AKID:".to_string()))
            .with_status(204)
            .create_async()
            .await;

        let storage = RestfulStorage::new(
            &format!("{}/data", server.url()),
            Credentials::new("AKID", "secret", ""),
            "RESTFUL",
            Arc::new(HmacSigner),
        )
        .unwrap();
        storage.delete(&encode_key("dir/file one")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_range() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/objects/k")
            .match_header("range", "bytes=5-")
            .with_status(206)
            .with_body("world")
            .create_async()
            .await;

        let storage =
            labstore::construct(&format!("{}/objects", server.url()), "", "", "").unwrap();
        let data = storage.get("k", ByteRange::new(5, None)).await.unwrap();
        assert_eq!(&data[..], b"world");
        mock.assert_async().await;
    }
}
