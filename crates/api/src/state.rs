use mongodb::Database;
use std::sync::Arc;
use wrenchly_config::Settings;
use wrenchly_services::{
    AuthService, ClerkService, EmailService, InviteService,
    dao::{
        appointment::AppointmentDao, invitation::InvitationDao, job::JobDao,
        mechanic::MechanicDao, shop::ShopDao, user::UserDao, waitlist::WaitlistDao,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub shops: Arc<ShopDao>,
    pub invitations: Arc<InvitationDao>,
    pub mechanics: Arc<MechanicDao>,
    pub jobs: Arc<JobDao>,
    pub appointments: Arc<AppointmentDao>,
    pub waitlist: Arc<WaitlistDao>,
    pub clerk: Arc<ClerkService>,
    pub email: Arc<EmailService>,
    pub invites: Arc<InviteService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> anyhow::Result<Self> {
        let auth = Arc::new(AuthService::new(&settings.clerk.jwt_public_key)?);
        let users = Arc::new(UserDao::new(&db));
        let shops = Arc::new(ShopDao::new(&db));
        let invitations = Arc::new(InvitationDao::new(&db));
        let mechanics = Arc::new(MechanicDao::new(&db));
        let jobs = Arc::new(JobDao::new(&db));
        let appointments = Arc::new(AppointmentDao::new(&db));
        let waitlist = Arc::new(WaitlistDao::new(&db));
        let clerk = Arc::new(ClerkService::new(&settings.clerk));
        let email = Arc::new(EmailService::new(&settings.email));

        let accept_url = format!(
            "{}{}",
            settings.app.public_url.trim_end_matches('/'),
            settings.clerk.accept_invite_path
        );
        let invites = Arc::new(InviteService::new(
            users.clone(),
            shops.clone(),
            invitations.clone(),
            mechanics.clone(),
            clerk.clone(),
            accept_url,
        ));

        Ok(Self {
            db,
            settings,
            auth,
            users,
            shops,
            invitations,
            mechanics,
            jobs,
            appointments,
            waitlist,
            clerk,
            email,
            invites,
        })
    }
}
