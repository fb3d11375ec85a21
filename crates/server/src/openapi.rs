use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String, pub role: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct CompanyProfileInputDoc {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(utoipa::ToSchema)]
pub struct CreatePostInputDoc {
    pub title: String,
    pub description: String,
    pub field: String,
    pub city: String,
    pub paid: bool,
}

#[derive(utoipa::ToSchema)]
pub struct UpdatePostInputDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub field: Option<String>,
    pub city: Option<String>,
    pub paid: Option<bool>,
    pub status: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct CreateApplicationInputDoc {
    pub post_id: Uuid,
    pub cover_letter: String,
    pub cv_key: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct DecideApplicationInputDoc { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct CreateReportInputDoc { pub message_id: String, pub reason: String }

#[derive(utoipa::ToSchema)]
pub struct CreateTopicInputDoc { pub title: String }

#[derive(utoipa::ToSchema)]
pub struct PostMessageInputDoc { pub body: String }

#[derive(utoipa::ToSchema)]
pub struct RecordVisitInputDoc { pub key: Option<String> }

#[derive(utoipa::ToSchema)]
pub struct PresignUploadInputDoc {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::companies::list,
        crate::routes::companies::create,
        crate::routes::companies::get,
        crate::routes::companies::update,
        crate::routes::posts::list,
        crate::routes::posts::create,
        crate::routes::posts::get,
        crate::routes::posts::update,
        crate::routes::posts::delete,
        crate::routes::applications::create,
        crate::routes::applications::list,
        crate::routes::applications::get,
        crate::routes::applications::decide,
        crate::routes::forum::list_topics,
        crate::routes::forum::create_topic,
        crate::routes::forum::get_topic,
        crate::routes::forum::list_messages,
        crate::routes::forum::post_message,
        crate::routes::reports::create,
        crate::routes::reports::list,
        crate::routes::reports::list_for_message,
        crate::routes::stats::record_visit,
        crate::routes::stats::overview,
        crate::routes::uploads::presign,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CompanyProfileInputDoc,
            CreatePostInputDoc,
            UpdatePostInputDoc,
            CreateApplicationInputDoc,
            DecideApplicationInputDoc,
            CreateReportInputDoc,
            CreateTopicInputDoc,
            PostMessageInputDoc,
            RecordVisitInputDoc,
            PresignUploadInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "companies"),
        (name = "posts"),
        (name = "applications"),
        (name = "forum"),
        (name = "reports"),
        (name = "stats"),
        (name = "uploads")
    )
)]
pub struct ApiDoc;
