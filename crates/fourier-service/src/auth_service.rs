//! Authentication service implementation.

use crate::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserInfo};
use async_trait::async_trait;
use fourier_core::{
    FourierError, FourierResult, NewUser, Page, PageRequest, Role, RoleKind, User, ValidateExt,
};
use fourier_repository::{Dao, DbSession, RoleDao, SessionManager, UserDao};
use fourier_security::{require_admin, PasswordHasher, TokenProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new user with the default role.
    async fn register(&self, request: RegisterRequest) -> FourierResult<MessageResponse>;

    /// Returns the user with `email` if `password` matches its hash.
    async fn authenticate_user(&self, email: &str, password: &str)
        -> FourierResult<Option<User>>;

    /// Checks credentials and issues an access token.
    async fn login(&self, request: LoginRequest) -> FourierResult<LoginResponse>;

    /// Acknowledges a logout; tokens are not tracked server-side.
    fn logout(&self) -> MessageResponse;

    /// Resolves the user a token was issued to.
    async fn current_user(&self, token: Option<&str>) -> FourierResult<User>;

    /// Like [`current_user`](Self::current_user), but any failure yields `None`.
    async fn current_user_optional(&self, token: Option<&str>) -> Option<User>;

    /// Resolves the current user and requires an admin role.
    async fn current_admin_user(&self, token: Option<&str>) -> FourierResult<User>;

    /// Builds the public view of `user`, including its role name.
    async fn user_info(&self, user: &User) -> FourierResult<UserInfo>;

    /// Lists every user.
    async fn list_users(&self) -> FourierResult<Vec<UserInfo>>;

    /// Lists one page of users.
    async fn list_users_page(&self, page: PageRequest) -> FourierResult<Page<UserInfo>>;
}

/// Authentication service backed by the user and role DAOs.
pub struct AuthServiceImpl {
    sessions: SessionManager,
    users: UserDao,
    roles: RoleDao,
    password_hasher: Arc<PasswordHasher>,
    token_provider: Arc<TokenProvider>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        password_hasher: Arc<PasswordHasher>,
        token_provider: Arc<TokenProvider>,
    ) -> Self {
        Self {
            sessions,
            users: UserDao::new(),
            roles: RoleDao::new(),
            password_hasher,
            token_provider,
        }
    }

    async fn insert_new_user(
        &self,
        session: &mut DbSession,
        new_user: &NewUser,
    ) -> FourierResult<User> {
        if self
            .users
            .find_by_email(session, &new_user.email)
            .await?
            .is_some()
        {
            warn!("Registration rejected: email already registered");
            return Err(FourierError::UserAlreadyExists);
        }

        self.users.add(session, new_user).await
    }

    fn password_matches(&self, password: &str, user: &User) -> bool {
        match self.password_hasher.verify(password, &user.password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                error!("Stored password hash for user {} is unreadable: {}", user.id, e);
                false
            }
        }
    }
}

fn role_name(role_id: i64, roles: &HashMap<i64, String>) -> String {
    roles.get(&role_id).cloned().unwrap_or_else(|| {
        RoleKind::from_id(role_id).map_or_else(|| "unknown".to_string(), |r| r.to_string())
    })
}

fn role_names(roles: Vec<Role>) -> HashMap<i64, String> {
    roles.into_iter().map(|r| (r.id, r.name)).collect()
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterRequest) -> FourierResult<MessageResponse> {
        debug!("Registering user");
        request.validate_request()?;

        // Hashing happens before the session takes the write lock.
        let password_hash = self.password_hasher.hash(&request.password)?;
        let new_user = NewUser::new(request.email, password_hash);

        let mut session = self.sessions.acquire_transactional_session().await?;
        let result = self.insert_new_user(&mut session, &new_user).await;
        let user = session.finish(result).await?;

        info!("User registered: {}", user.id);
        Ok(MessageResponse::new("You have been registered successfully!"))
    }

    async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
    ) -> FourierResult<Option<User>> {
        let users = self.users;
        let email = email.to_string();
        let user = self
            .sessions
            .with_session(move |session| {
                Box::pin(async move { users.find_by_email(session, &email).await })
            })
            .await?;

        Ok(user.filter(|user| self.password_matches(password, user)))
    }

    async fn login(&self, request: LoginRequest) -> FourierResult<LoginResponse> {
        debug!("Login attempt");
        request.validate_request()?;

        let user = self
            .authenticate_user(&request.email, &request.password)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: incorrect email or password");
                FourierError::IncorrectEmailOrPassword
            })?;

        let access_token = self.token_provider.create_access_token(user.id)?;
        info!("User logged in: {}", user.id);
        Ok(LoginResponse::new(access_token))
    }

    fn logout(&self) -> MessageResponse {
        MessageResponse::new("User is logged out")
    }

    async fn current_user(&self, token: Option<&str>) -> FourierResult<User> {
        let token = token.ok_or(FourierError::TokenNotFound)?;
        let user_id = self.token_provider.subject_user_id(token)?;

        let users = self.users;
        self.sessions
            .with_session(move |session| {
                Box::pin(async move { users.find_one_or_none_by_id(session, user_id).await })
            })
            .await?
            .ok_or_else(|| {
                warn!("Token subject {} does not match a user", user_id);
                FourierError::UserNotFound
            })
    }

    async fn current_user_optional(&self, token: Option<&str>) -> Option<User> {
        token?;
        match self.current_user(token).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("No current user: {}", e);
                None
            }
        }
    }

    async fn current_admin_user(&self, token: Option<&str>) -> FourierResult<User> {
        require_admin(self.current_user(token).await?)
    }

    async fn user_info(&self, user: &User) -> FourierResult<UserInfo> {
        let roles = self.roles;
        let role_id = user.role_id;
        let role = self
            .sessions
            .with_session(move |session| {
                Box::pin(async move { roles.find_one_or_none_by_id(session, role_id).await })
            })
            .await?;

        let names = role_names(role.into_iter().collect());
        Ok(UserInfo::new(user, role_name(role_id, &names)))
    }

    async fn list_users(&self) -> FourierResult<Vec<UserInfo>> {
        let (users, roles) = (self.users, self.roles);
        let (all_users, all_roles) = self
            .sessions
            .with_session(move |session| {
                Box::pin(async move {
                    let all_users = users.find_all(session, None).await?;
                    let all_roles = roles.find_all(session, None).await?;
                    Ok::<_, FourierError>((all_users, all_roles))
                })
            })
            .await?;

        debug!("Listing {} users", all_users.len());
        let names = role_names(all_roles);
        Ok(all_users
            .iter()
            .map(|user| UserInfo::new(user, role_name(user.role_id, &names)))
            .collect())
    }

    async fn list_users_page(&self, page: PageRequest) -> FourierResult<Page<UserInfo>> {
        let (users, roles) = (self.users, self.roles);
        let (content, total, all_roles) = self
            .sessions
            .with_session(move |session| {
                Box::pin(async move {
                    let content = users.paginate(session, page, None).await?;
                    let total = users.count(session, None).await?;
                    let all_roles = roles.find_all(session, None).await?;
                    Ok::<_, FourierError>((content, total, all_roles))
                })
            })
            .await?;

        let names = role_names(all_roles);
        Ok(Page::new(content, page, total)
            .map(|user| UserInfo::new(&user, role_name(user.role_id, &names))))
    }
}

impl std::fmt::Debug for AuthServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServiceImpl").finish_non_exhaustive()
    }
}
