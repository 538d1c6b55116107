//! Player endpoints

use crate::http::ApiClient;
use idlerealm_admin::ApiError;
use idlerealm_core::{FactoryId, PlayerState, RealmId, SkillId};
use serde::de::IgnoredAny;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FactoryUpgrade {
    factory_id: FactoryId,
    count: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SkillUpgrade {
    skill_id: SkillId,
}

/// Player-facing actions; the server stays authoritative, so every action
/// only reports success and the caller refreshes the profile afterwards
#[derive(Debug, Clone)]
pub struct PlayerApi {
    client: ApiClient,
}

impl PlayerApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Current snapshot of the player's resources, factories, skills and realms
    pub async fn profile(&self) -> Result<PlayerState, ApiError> {
        self.client.get("/api/player/profile", &[]).await
    }

    /// Buy `count` levels of a factory
    pub async fn upgrade_factory(&self, factory_id: FactoryId, count: u32) -> Result<(), ApiError> {
        debug!(%factory_id, count, "upgrading factory");
        let body = FactoryUpgrade { factory_id, count };
        self.client
            .post::<IgnoredAny, _>("/api/player/factories/upgrade", Some(&body))
            .await
            .map(|_| ())
    }

    pub async fn upgrade_skill(&self, skill_id: SkillId) -> Result<(), ApiError> {
        debug!(%skill_id, "upgrading skill");
        self.client
            .post::<IgnoredAny, _>("/api/player/skills/upgrade", Some(&SkillUpgrade { skill_id }))
            .await
            .map(|_| ())
    }

    pub async fn unlock_realm(&self, realm_id: RealmId) -> Result<(), ApiError> {
        self.client
            .post::<IgnoredAny, ()>(&format!("/api/player/realms/{}/unlock", realm_id.raw()), None)
            .await
            .map(|_| ())
    }

    pub async fn activate_realm(&self, realm_id: RealmId) -> Result<(), ApiError> {
        self.client
            .post::<IgnoredAny, ()>(&format!("/api/player/realms/{}/activate", realm_id.raw()), None)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{client_for, serve};

    #[test]
    fn test_upgrade_bodies() {
        let body = serde_json::to_string(&FactoryUpgrade {
            factory_id: FactoryId::new(7),
            count: 10,
        })
        .unwrap();
        assert_eq!(body, r#"{"factoryId":7,"count":10}"#);

        let body = serde_json::to_string(&SkillUpgrade { skill_id: SkillId::new(2) }).unwrap();
        assert_eq!(body, r#"{"skillId":2}"#);
    }

    #[tokio::test]
    async fn test_profile_and_actions() {
        let (base, server) = serve(vec![
            (
                200,
                r#"{"resources": [{"resourceId": 1, "code": "ORE", "name": "Ore", "amount": 120.5}],
                    "factories": [], "skills": [], "realms": [], "realmUnlockCosts": []}"#,
            ),
            (200, r#"{"ok": true}"#),
            (400, r#"{"error": "Ressources insuffisantes"}"#),
        ])
        .await;
        let api = PlayerApi::new(client_for(&base));

        let state = api.profile().await.unwrap();
        assert_eq!(state.resources[0].amount, 120.5);

        api.activate_realm(RealmId::new(2)).await.unwrap();
        let err = api.upgrade_factory(FactoryId::new(3), 1).await.unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Ressources insuffisantes"));

        let seen = server.await.unwrap();
        assert!(seen[0].starts_with("GET /api/player/profile "));
        assert!(seen[1].starts_with("POST /api/player/realms/2/activate "));
        assert!(seen[2].ends_with(r#"{"factoryId":3,"count":1}"#));
    }
}
