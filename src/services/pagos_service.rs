use crate::auth::rbac::Capability;
use crate::auth::session::UserProfile;
use crate::auth::store::SessionStore;
use crate::error::{ClientError, ClientResult};
use crate::models::{PaymentBreakdown, PaymentList};
use crate::require_capability;
use crate::services::api_client::ApiClient;
use std::sync::Arc;

/// Capability-gated reads of the payments endpoints.
pub struct PagosService {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl PagosService {
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { client, session }
    }

    /// Charges owed by `usuario_id`. Reading someone else's breakdown also
    /// needs `viewAllPagos`.
    pub async fn fetch_breakdown(&self, usuario_id: i64) -> ClientResult<PaymentBreakdown> {
        let user = self.signed_in_user().await?;
        let permissions = self.session.permissions();

        require_capability!(permissions, Capability::ViewPagos);
        if user.id != usuario_id {
            require_capability!(permissions, Capability::ViewAllPagos);
        }

        self.client
            .get_json(&format!("/pagos/residente/{}", usuario_id))
            .await
    }

    /// Breakdown of the signed-in user.
    pub async fn fetch_own_breakdown(&self) -> ClientResult<PaymentBreakdown> {
        let user = self.signed_in_user().await?;
        self.fetch_breakdown(user.id).await
    }

    pub async fn fetch_all(&self) -> ClientResult<PaymentList> {
        self.signed_in_user().await?;
        require_capability!(self.session.permissions(), Capability::ViewAllPagos);

        self.client.get_json("/pagos/todos").await
    }

    async fn signed_in_user(&self) -> ClientResult<UserProfile> {
        self.session
            .active_session()
            .await
            .map(|session| session.profile.clone())
            .ok_or_else(|| ClientError::authentication("Not signed in"))
    }
}
