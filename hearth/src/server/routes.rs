use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::{
    errors::{EntityKind, HearthError, ValidationError},
    graph::{AcceptOutcome, RequestOutcome},
    network::NewPost,
    types::{Comment, Notification, Post, PostId, Privacy, ReactionKind, User, UserId},
};

/// `{"message": ...}` body used for acknowledgements and errors alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// A failed request, rendered as a status code plus [`MessageBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Routes where the user is a body field report an unknown user as a bad request.
    fn user_is_input(err: HearthError) -> Self {
        match err.missing_entity() {
            Some(EntityKind::User) => Self::new(StatusCode::BAD_REQUEST, "User not found"),
            _ => err.into(),
        }
    }
}

impl From<HearthError> for ApiError {
    fn from(err: HearthError) -> Self {
        match &err {
            HearthError::NotFound { entity, .. } => {
                let message = match entity {
                    EntityKind::User => "User not found",
                    EntityKind::Post => "Post not found",
                };
                Self::new(StatusCode::NOT_FOUND, message)
            }
            HearthError::InvalidInput(validation) => Self::new(StatusCode::BAD_REQUEST, validation.summary()),
            _ => {
                error!("request failed: {err}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save changes")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.summary())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, MessageBody::new(self.message)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// JSON body extractor whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub(crate) struct JsonBody<T>(T);

/// Path extractor whose rejections render as [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub(crate) struct Path<T>(T);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostsQuery {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostBody {
    user_id: UserId,
    text: String,
    #[serde(default)]
    media: Option<String>,
    #[serde(default)]
    privacy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReactBody {
    user_id: UserId,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentBody {
    user_id: UserId,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FromUserBody {
    from_user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FriendBody {
    friend_id: UserId,
}

pub(crate) async fn list_users(State(network): State<AppState>) -> Json<Vec<User>> {
    Json(network.users().await)
}

pub(crate) async fn list_posts(State(network): State<AppState>, Query(query): Query<PostsQuery>) -> Json<Vec<Post>> {
    let viewer = query.user_id.as_deref().and_then(|raw| raw.trim().parse::<UserId>().ok());
    match viewer {
        Some(viewer) => Json(network.visible_posts(viewer).await),
        None => Json(Vec::new()),
    }
}

pub(crate) async fn create_post(
    State(network): State<AppState>,
    JsonBody(body): JsonBody<CreatePostBody>,
) -> ApiResult<Post> {
    let privacy = match body.privacy.as_deref() {
        None => Privacy::default(),
        Some(raw) => raw
            .parse()
            .map_err(|_| ValidationError::single("privacy", "validation.privacy", "must be public or friends"))?,
    };
    let request = NewPost {
        user_id: body.user_id,
        text: body.text,
        media: body.media.filter(|media| !media.trim().is_empty()),
        privacy,
    };
    network.create_post(request).await.map(Json).map_err(ApiError::user_is_input)
}

pub(crate) async fn react(
    State(network): State<AppState>,
    Path(post_id): Path<PostId>,
    JsonBody(body): JsonBody<ReactBody>,
) -> ApiResult<Post> {
    let kind: ReactionKind = body
        .kind
        .parse()
        .map_err(|_| ValidationError::single("type", "validation.reaction", "unknown reaction type"))?;
    network
        .react(post_id, body.user_id, kind)
        .await
        .map(Json)
        .map_err(ApiError::user_is_input)
}

pub(crate) async fn comment(
    State(network): State<AppState>,
    Path(post_id): Path<PostId>,
    JsonBody(body): JsonBody<CommentBody>,
) -> ApiResult<Comment> {
    network
        .comment(post_id, body.user_id, body.text)
        .await
        .map(Json)
        .map_err(ApiError::user_is_input)
}

pub(crate) async fn send_friend_request(
    State(network): State<AppState>,
    Path(target): Path<UserId>,
    JsonBody(body): JsonBody<FromUserBody>,
) -> ApiResult<MessageBody> {
    let message = match network.send_friend_request(body.from_user_id, target).await? {
        RequestOutcome::Sent => "Request sent",
        RequestOutcome::AlreadyPending => "Request already sent",
        RequestOutcome::AlreadyFriends => "Already friends",
        RequestOutcome::SelfRequest => "Cannot send a request to yourself",
    };
    Ok(MessageBody::new(message))
}

pub(crate) async fn accept_friend(
    State(network): State<AppState>,
    Path(user): Path<UserId>,
    JsonBody(body): JsonBody<FromUserBody>,
) -> ApiResult<MessageBody> {
    let message = match network.accept_friend_request(user, body.from_user_id).await? {
        AcceptOutcome::Accepted => "Friend added",
        AcceptOutcome::AlreadyFriends => "Already friends",
        AcceptOutcome::NoPendingRequest => "No pending request",
    };
    Ok(MessageBody::new(message))
}

pub(crate) async fn cancel_request(
    State(network): State<AppState>,
    Path(target): Path<UserId>,
    JsonBody(body): JsonBody<FromUserBody>,
) -> ApiResult<MessageBody> {
    network.cancel_sent_request(body.from_user_id, target).await?;
    Ok(MessageBody::new("Request canceled"))
}

pub(crate) async fn remove_friend(
    State(network): State<AppState>,
    Path(user): Path<UserId>,
    JsonBody(body): JsonBody<FriendBody>,
) -> ApiResult<MessageBody> {
    network.remove_friend(user, body.friend_id).await?;
    Ok(MessageBody::new("Friend removed"))
}

pub(crate) async fn delete_request(
    State(network): State<AppState>,
    Path(user): Path<UserId>,
    JsonBody(body): JsonBody<FromUserBody>,
) -> ApiResult<MessageBody> {
    network.delete_incoming_request(user, body.from_user_id).await?;
    Ok(MessageBody::new("Request deleted"))
}

pub(crate) async fn list_notifications(
    State(network): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Json<Vec<Notification>> {
    Json(network.notifications_for(user_id).await)
}
