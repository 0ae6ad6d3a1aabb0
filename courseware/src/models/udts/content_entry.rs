use charybdis::macros::charybdis_udt_model;
use charybdis::types::{Boolean, Int, Text, Uuid};
use serde::{Deserialize, Serialize};

/// One row of a container's denormalized content list.
#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
#[charybdis_udt_model(type_name = contententry)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub item_kind: Text,
    pub ref_id: Uuid,
    pub title: Text,

    #[serde(rename = "order")]
    pub order_index: Int,

    pub preview: Boolean,
}
