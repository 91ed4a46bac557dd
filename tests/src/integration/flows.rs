//! End-to-end flows: publisher body in, HTTP answer out.

#[cfg(test)]
mod tests {
    use super::super::harness::{local_config, PublisherStub, RunningReceiver};
    use pg_01_push_verification::test_helpers::{
        foreign_signing_key, notification, sign, sign_with, subscription_confirmation, to_body,
        to_json, unsubscribe_confirmation, with_cert_url, with_signature_version, TEST_TOPIC,
    };
    use pg_01_push_verification::PushMessage;
    use serde_json::json;
    use std::time::Duration;

    const WRONG_TOPIC: &str = "arn:aws:sns:region:123456789012:wrong-topic";

    fn signed_notification(publisher: &PublisherStub, topic: &str, body: &str) -> PushMessage {
        sign(&with_cert_url(notification(topic, body), &publisher.cert_url()))
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    #[tokio::test]
    async fn test_valid_notification_accepted() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = signed_notification(&publisher, TEST_TOPIC, "Test message");
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({"status": "success", "message": "Message received"}));
        assert_eq!(publisher.certificate_hits(), 1);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_topic_mismatch_rejected_before_fetch() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = signed_notification(&publisher, WRONG_TOPIC, "Test message");
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid TopicArn"}));
        assert_eq!(publisher.certificate_hits(), 0);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_tampered_body_rejected() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let mut payload = to_json(&signed_notification(&publisher, TEST_TOPIC, "Test message"));
        payload["Message"] = json!("Tampered message");
        let (status, body) = receiver.post(payload.to_string().into_bytes()).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid signature"}));
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_signature_from_foreign_key_rejected() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = sign_with(
            &with_cert_url(notification(TEST_TOPIC, "Test message"), &publisher.cert_url()),
            &foreign_signing_key(),
        );
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid signature"}));
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_sha1_signature_version_accepted() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = sign(&with_signature_version(
            with_cert_url(notification(TEST_TOPIC, "legacy"), &publisher.cert_url()),
            "1",
        ));
        let (status, _) = receiver.post(to_body(&message)).await;
        assert_eq!(status, 200);

        // The same signature presented as version 2 must not verify
        let mut payload = to_json(&message);
        payload["SignatureVersion"] = json!("2");
        let (status, body) = receiver.post(payload.to_string().into_bytes()).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid signature"}));
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_untrusted_certificate_origin_refused() {
        let publisher = PublisherStub::start().await;
        let mut config = local_config();
        config.certificates.allowed_domains = vec!["amazonaws.com".to_string()];
        let receiver = RunningReceiver::start(config).await;

        let message = signed_notification(&publisher, TEST_TOPIC, "Test message");
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid signature"}));
        assert_eq!(publisher.certificate_hits(), 0);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_certificate_cache_reused() {
        let publisher = PublisherStub::start().await;
        let mut config = local_config();
        config.certificates.cache_ttl = Some(Duration::from_secs(60));
        let receiver = RunningReceiver::start(config).await;

        for body in ["first", "second", "third"] {
            let message = signed_notification(&publisher, TEST_TOPIC, body);
            let (status, _) = receiver.post(to_body(&message)).await;
            assert_eq!(status, 200);
        }

        assert_eq!(publisher.certificate_hits(), 1);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_without_cache_every_message_fetches() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        for body in ["first", "second"] {
            let message = signed_notification(&publisher, TEST_TOPIC, body);
            receiver.post(to_body(&message)).await;
        }

        assert_eq!(publisher.certificate_hits(), 2);
        receiver.stop().await;
    }

    // =========================================================================
    // SUBSCRIPTION LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_subscription_confirmed() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = sign(&with_cert_url(
            subscription_confirmation(TEST_TOPIC, &publisher.confirm_url()),
            &publisher.cert_url(),
        ));
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Subscription confirmed"})
        );
        assert_eq!(publisher.confirm_hits(), 1);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_subscription_confirmation_failure() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = sign(&with_cert_url(
            subscription_confirmation(TEST_TOPIC, &publisher.refuse_url()),
            &publisher.cert_url(),
        ));
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid SubscribeURL"}));
        assert_eq!(publisher.confirm_hits(), 1);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_redirecting_subscribe_url_refused() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = sign(&with_cert_url(
            subscription_confirmation(TEST_TOPIC, &publisher.redirect_url()),
            &publisher.cert_url(),
        ));
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid SubscribeURL"}));
        assert_eq!(publisher.confirm_hits(), 0);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_restricted_subscribe_url_not_visited() {
        let publisher = PublisherStub::start().await;
        let mut config = local_config();
        config.receiver.restrict_subscribe_url = true;
        let receiver = RunningReceiver::start(config).await;

        let message = sign(&with_cert_url(
            subscription_confirmation(TEST_TOPIC, "http://confirm.example.net/confirm"),
            &publisher.cert_url(),
        ));
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 400);
        assert_eq!(body, json!({"detail": "Invalid SubscribeURL"}));
        assert_eq!(publisher.confirm_hits(), 0);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_acknowledged_without_visit() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let message = sign(&with_cert_url(
            unsubscribe_confirmation(TEST_TOPIC, &publisher.confirm_url()),
            &publisher.cert_url(),
        ));
        let (status, body) = receiver.post(to_body(&message)).await;

        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Unsubscribe confirmed"})
        );
        assert_eq!(publisher.confirm_hits(), 0);
        receiver.stop().await;
    }

    // =========================================================================
    // MALFORMED INPUT
    // =========================================================================

    #[tokio::test]
    async fn test_unparseable_body() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let (status, body) = receiver.post(b"invalid json".to_vec()).await;

        assert_eq!(status, 422);
        assert!(!body["detail"].as_array().unwrap().is_empty());
        assert_eq!(publisher.certificate_hits(), 0);
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_message_type() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let mut payload = to_json(&signed_notification(&publisher, TEST_TOPIC, "Test message"));
        payload["Type"] = json!("InvalidType");
        let (status, body) = receiver.post(payload.to_string().into_bytes()).await;

        assert_eq!(status, 422);
        assert_eq!(body["detail"][0]["type"], "union_tag_invalid");
        receiver.stop().await;
    }

    #[tokio::test]
    async fn test_extra_fields_ignored() {
        let publisher = PublisherStub::start().await;
        let receiver = RunningReceiver::start(local_config()).await;

        let mut payload = to_json(&signed_notification(&publisher, TEST_TOPIC, "Test message"));
        payload["UnsubscribeURL"] = json!("https://sns.us-east-1.amazonaws.com/?Action=Unsubscribe");
        let (status, _) = receiver.post(payload.to_string().into_bytes()).await;

        assert_eq!(status, 200);
        receiver.stop().await;
    }
}
