use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Caller-defined fields; any JSON object is accepted.
#[derive(ToSchema)]
pub struct ItemInputDoc {
    pub name: Option<String>,
    pub quantity: Option<f64>,
}

#[derive(ToSchema)]
pub struct ItemDoc {
    pub id: u64,
    pub name: Option<String>,
    pub quantity: Option<f64>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Item Store",
        description = "Item CRUD API. Datastore is a JSON file"
    ),
    paths(
        crate::routes::health,
        crate::routes::items::create_item,
        crate::routes::items::list_items,
        crate::routes::items::get_item,
        crate::routes::items::update_item,
        crate::routes::items::delete_item,
    ),
    components(
        schemas(
            HealthResponse,
            ItemInputDoc,
            ItemDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "Items", description = "Operations related to item crud")
    )
)]
pub struct ApiDoc;
