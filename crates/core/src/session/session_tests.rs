//! Tests for session records and session stores.

#[cfg(test)]
mod tests {
    use crate::entities::EntityId;
    use crate::session::{
        CookieNames, FileSessionStore, MemorySessionStore, Session, SessionStore, TokenGrant,
    };
    use crate::users::User;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn user() -> User {
        User {
            id: EntityId::new("u1"),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            name: "Jane Doe".to_string(),
            created: None,
            created_by: None,
            updated: None,
            updated_by: None,
        }
    }

    fn session_expiring_in(duration: Duration) -> Session {
        Session {
            token: "tok-1".to_string(),
            expiration: Utc::now() + duration,
            user: user(),
        }
    }

    #[test]
    fn test_decode_login_payload() {
        let session: Session = serde_json::from_value(json!({
            "expiration": 1_700_000_000_000_i64,
            "token": "abc",
            "user": { "id": "U1", "username": "jane" }
        }))
        .unwrap();

        assert_eq!(session.token, "abc");
        assert_eq!(session.user.id.as_str(), "u1");
        assert_eq!(
            session.expiration,
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
        );
        assert!(session.is_expired(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()));
        assert!(!session.is_expired(Utc.timestamp_millis_opt(1_600_000_000_000).unwrap()));
    }

    #[test]
    fn test_renew_keeps_user() {
        let mut session = session_expiring_in(Duration::minutes(1));
        let expiration = Utc::now() + Duration::hours(1);
        session.renew(TokenGrant {
            token: "tok-2".to_string(),
            expiration,
        });

        assert_eq!(session.token, "tok-2");
        assert_eq!(session.user.username, "jane");
        assert_eq!(session.expiration, expiration);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());

        let session = session_expiring_in(Duration::hours(1));
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_hides_expired_session() {
        let store = MemorySessionStore::with_session(session_expiring_in(Duration::hours(-1)));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(file.clone(), CookieNames::default());

        let session = session_expiring_in(Duration::hours(1));
        store.save(&session).unwrap();
        assert!(file.exists());

        let restored = FileSessionStore::new(file.clone(), CookieNames::default())
            .load()
            .unwrap()
            .unwrap();
        assert_eq!(restored.token, session.token);
        assert_eq!(restored.user, session.user);
        assert_eq!(
            restored.expiration.timestamp_millis(),
            session.expiration.timestamp_millis()
        );

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        let user_data = raw["cookies"]["userData"]["value"].as_str().unwrap();
        let decoded = BASE64.decode(user_data).unwrap();
        let stored: User = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(stored.username, "jane");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_drops_expired_entries() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"), CookieNames::default());

        store
            .save(&session_expiring_in(Duration::seconds(-5)))
            .unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_custom_names_and_locale() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("session.json");
        let names = CookieNames {
            token: "t".to_string(),
            user_data: "u".to_string(),
        };
        let store = FileSessionStore::new(file.clone(), names);

        store.save_locale("fr-FR").unwrap();
        store.save(&session_expiring_in(Duration::hours(1))).unwrap();
        store.clear().unwrap();

        assert_eq!(store.load_locale().unwrap().as_deref(), Some("fr-FR"));
        let raw = fs::read_to_string(&file).unwrap();
        assert!(!raw.contains("\"t\""));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"), CookieNames::default());
        assert!(store.load().unwrap().is_none());
        assert!(store.load_locale().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_jar_is_replaced_on_next_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(path.clone(), CookieNames::default());

        assert!(store.load().unwrap().is_none());
        assert!(store.load_locale().unwrap().is_none());
        store.clear().unwrap();

        let session = session_expiring_in(Duration::hours(1));
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));
        let jar: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(jar["version"], json!(1));
    }
}
