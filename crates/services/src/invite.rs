use std::sync::Arc;

use bson::{oid::ObjectId, DateTime};
use nanoid::nanoid;
use tracing::{info, warn};
use wrenchly_db::models::{InvitationStatus, MemberRole, ShopInvitation, User, UserRole};

use crate::clerk::{ClerkError, ClerkService, InvitationMetadata};
use crate::dao::base::DaoError;
use crate::dao::invitation::InvitationDao;
use crate::dao::mechanic::MechanicDao;
use crate::dao::shop::ShopDao;
use crate::dao::user::UserDao;

#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("Invitation not found")]
    NotFound,
    #[error("This invitation has been revoked")]
    Revoked,
    #[error("This invitation has expired")]
    Expired,
    #[error("This invitation was already accepted")]
    AlreadyAccepted,
    #[error("No account found for this invitation")]
    UserNotFound,
    #[error("{0}")]
    NotAuthorized(String),
    #[error(transparent)]
    Dao(#[from] DaoError),
    #[error(transparent)]
    Clerk(#[from] ClerkError),
}

#[derive(Debug, Clone)]
pub struct IssueInvite {
    pub shop_id: ObjectId,
    pub email: String,
    pub role: MemberRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub mechanic_id: Option<ObjectId>,
}

/// Where a stored invitation sits in its lifecycle at a given instant.
/// Expiry is evaluated lazily here; nothing sweeps the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceState {
    Acceptable,
    AlreadyAccepted,
    Revoked,
    Expired,
}

/// Guard ordering is deliberate and shared by every acceptance path:
/// revocation is terminal and wins over expiry, prior acceptance
/// short-circuits idempotently, expiry is checked last.
pub fn acceptance_state(invitation: &ShopInvitation, now: DateTime) -> AcceptanceState {
    match invitation.status {
        InvitationStatus::Revoked => AcceptanceState::Revoked,
        InvitationStatus::Accepted => AcceptanceState::AlreadyAccepted,
        InvitationStatus::Expired => AcceptanceState::Expired,
        InvitationStatus::Pending => {
            if now > invitation.expires_at {
                AcceptanceState::Expired
            } else {
                AcceptanceState::Acceptable
            }
        }
    }
}

/// The team-invitation workflow.
///
/// The identity provider and the document store share no transaction, so
/// issuance can leave them inconsistent (provider invitation without a
/// local record, or metadata patched on an account that never accepts).
/// Rather than trusting any prior step, every acceptance trigger funnels
/// into [`InviteService::reconcile`], which re-derives the correct end
/// state from whatever records exist and is safe to call any number of
/// times.
pub struct InviteService {
    users: Arc<UserDao>,
    shops: Arc<ShopDao>,
    invitations: Arc<InvitationDao>,
    mechanics: Arc<MechanicDao>,
    clerk: Arc<ClerkService>,
    accept_url: String,
}

impl InviteService {
    pub fn new(
        users: Arc<UserDao>,
        shops: Arc<ShopDao>,
        invitations: Arc<InvitationDao>,
        mechanics: Arc<MechanicDao>,
        clerk: Arc<ClerkService>,
        accept_url: String,
    ) -> Self {
        Self {
            users,
            shops,
            invitations,
            mechanics,
            clerk,
            accept_url,
        }
    }

    // ---- Issuance --------------------------------------------------------

    pub async fn issue(
        &self,
        inviter: &User,
        req: IssueInvite,
    ) -> Result<ShopInvitation, InviteError> {
        let inviter_id = inviter.id.ok_or(InviteError::UserNotFound)?;
        let email = req.email.trim().to_lowercase();

        let membership = self
            .shops
            .find_membership(req.shop_id, inviter_id)
            .await?
            .ok_or_else(|| {
                InviteError::NotAuthorized("You are not a member of this shop".to_string())
            })?;
        if !membership.role.can_manage_team() {
            return Err(InviteError::NotAuthorized(
                "Only shop owners and managers can invite team members".to_string(),
            ));
        }

        if self
            .invitations
            .find_pending(req.shop_id, &email)
            .await?
            .is_some()
        {
            return Err(InviteError::Dao(DaoError::Conflict(format!(
                "A pending invitation for {email} already exists"
            ))));
        }

        // A named invitee without a profile gets one up front, so the
        // invitation (and later the membership) can reference it before
        // the account exists.
        let mechanic_id = match req.mechanic_id {
            Some(id) => Some(id),
            None => {
                let name = match (&req.first_name, &req.last_name) {
                    (Some(f), Some(l)) => Some(format!("{f} {l}")),
                    (Some(f), None) => Some(f.clone()),
                    (None, Some(l)) => Some(l.clone()),
                    (None, None) => None,
                };
                match name {
                    Some(name) => {
                        let mechanic = self
                            .mechanics
                            .create(req.shop_id, name, req.title.clone())
                            .await?;
                        mechanic.id
                    }
                    None => None,
                }
            }
        };

        let token = nanoid!(32);
        let metadata = InvitationMetadata {
            role: req.role.as_str().to_string(),
            shop_id: req.shop_id.to_hex(),
            invitation_token: token.clone(),
            mechanic_id: mechanic_id.map(|id| id.to_hex()),
        };
        let redirect_url = format!("{}?token={token}", self.accept_url);

        let clerk_invitation_id = match self
            .clerk
            .create_invitation(&email, &metadata, &redirect_url)
            .await
        {
            Ok(id) => Some(id),
            Err(ClerkError::EmailTaken) => {
                // Existing account: no invitation flow will fire for it, so
                // the correlation metadata has to ride on the user instead.
                match self.clerk.find_user_by_email(&email).await? {
                    Some(user) => {
                        self.clerk.update_user_metadata(&user.id, &metadata).await?;
                        info!(email = %email, "Invitee already has an account; patched metadata");
                    }
                    None => {
                        warn!(email = %email, "Provider reported email taken but no user found");
                    }
                }
                None
            }
            Err(ClerkError::DuplicateInvitation) => {
                info!(email = %email, "Provider invitation already exists; continuing");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let invitation = self
            .invitations
            .create(
                req.shop_id,
                inviter_id,
                &email,
                req.role,
                &token,
                mechanic_id,
                clerk_invitation_id,
            )
            .await?;

        info!(
            shop_id = %req.shop_id,
            email = %email,
            role = %req.role.as_str(),
            "Issued team invitation"
        );

        Ok(invitation)
    }

    // ---- Reconciliation --------------------------------------------------

    /// Bring membership, user role, and invitation status in line with an
    /// acceptance. Idempotent: each write is guarded by a read of current
    /// state, so redundant triggers (webhook retry, page + webhook racing)
    /// converge on the same end state.
    pub async fn reconcile(
        &self,
        invitation: &ShopInvitation,
        user: &User,
    ) -> Result<ObjectId, InviteError> {
        let invitation_id = invitation.id.ok_or(InviteError::NotFound)?;
        let user_id = user.id.ok_or(InviteError::UserNotFound)?;

        match acceptance_state(invitation, DateTime::now()) {
            AcceptanceState::Revoked => Err(InviteError::Revoked),
            AcceptanceState::AlreadyAccepted => Ok(invitation.shop_id),
            AcceptanceState::Expired => {
                self.invitations.mark_expired(invitation_id).await?;
                Err(InviteError::Expired)
            }
            AcceptanceState::Acceptable => {
                self.shops
                    .add_member(
                        invitation.shop_id,
                        user_id,
                        invitation.role,
                        invitation.mechanic_id,
                        Some(invitation.created_at),
                    )
                    .await?;

                // Owners and admins keep their elevated role even when they
                // accept an invitation into another shop.
                if !matches!(user.role, UserRole::Admin | UserRole::ShopOwner) {
                    self.users.set_role(user_id, UserRole::ShopMechanic).await?;
                }

                self.invitations.mark_accepted(invitation_id).await?;

                info!(
                    shop_id = %invitation.shop_id,
                    user_id = %user_id,
                    "Invitation accepted"
                );
                Ok(invitation.shop_id)
            }
        }
    }

    // ---- Acceptance entry points -----------------------------------------

    /// Page-driven path: the caller is signed in and presents the token
    /// from the acceptance URL. Covers pre-existing accounts, for which
    /// no user-created event ever fires.
    pub async fn accept_as_user(&self, token: &str, user: &User) -> Result<ObjectId, InviteError> {
        let invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or(InviteError::NotFound)?;

        self.reconcile(&invitation, user).await
    }

    /// Webhook-driven path for freshly created accounts. The token from
    /// provider metadata is the strongest correlation key; email is the
    /// fallback. Returns `Ok(None)` when there is nothing to reconcile.
    pub async fn accept_for_clerk_user(
        &self,
        clerk_user_id: &str,
        email: &str,
        token: Option<&str>,
    ) -> Result<Option<ObjectId>, InviteError> {
        let user = self
            .users
            .find_by_clerk_id(clerk_user_id)
            .await
            .map_err(|e| match e {
                DaoError::NotFound => InviteError::UserNotFound,
                other => InviteError::Dao(other),
            })?;

        let mut invitation = None;
        if let Some(token) = token {
            invitation = self.invitations.find_by_token(token).await?;
        }
        if invitation.is_none() {
            invitation = self.invitations.find_pending_by_email(email).await?;
        }

        match invitation {
            Some(invitation) => Ok(Some(self.reconcile(&invitation, &user).await?)),
            None => Ok(None),
        }
    }

    /// Fallback path for the provider's invitation-accepted event, which
    /// carries the provider invitation id and email but no application
    /// user id.
    pub async fn accept_by_clerk_invitation(
        &self,
        clerk_invitation_id: &str,
        email: &str,
    ) -> Result<Option<ObjectId>, InviteError> {
        let mut invitation = self
            .invitations
            .find_by_clerk_invitation_id(clerk_invitation_id)
            .await?;
        if invitation.is_none() {
            invitation = self.invitations.find_pending_by_email(email).await?;
        }

        let Some(invitation) = invitation else {
            return Ok(None);
        };

        let user = self.users.find_by_email(email).await.map_err(|e| match e {
            DaoError::NotFound => InviteError::UserNotFound,
            other => InviteError::Dao(other),
        })?;

        Ok(Some(self.reconcile(&invitation, &user).await?))
    }

    // ---- Revocation ------------------------------------------------------

    /// Revoke a pending invitation. The caller must be an owner or
    /// manager of the invitation's shop.
    pub async fn revoke(
        &self,
        invitation_id: ObjectId,
        caller: &User,
    ) -> Result<(), InviteError> {
        let caller_id = caller.id.ok_or(InviteError::UserNotFound)?;

        let invitation = self
            .invitations
            .base
            .find_by_id(invitation_id)
            .await
            .map_err(|e| match e {
                DaoError::NotFound => InviteError::NotFound,
                other => InviteError::Dao(other),
            })?;

        let membership = self
            .shops
            .find_membership(invitation.shop_id, caller_id)
            .await?;
        if !membership.is_some_and(|m| m.role.can_manage_team()) {
            return Err(InviteError::NotAuthorized(
                "Only shop owners and managers can revoke invitations".to_string(),
            ));
        }

        match invitation.status {
            InvitationStatus::Revoked => Ok(()),
            InvitationStatus::Accepted => Err(InviteError::AlreadyAccepted),
            InvitationStatus::Pending | InvitationStatus::Expired => {
                self.invitations.mark_revoked(invitation_id).await?;
                info!(invitation_id = %invitation_id, "Invitation revoked");
                Ok(())
            }
        }
    }
}
