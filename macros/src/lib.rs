mod traits;

use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, Ident};
use traits::FieldNames;

/// Container fields in lookup priority. Lectures and quizzes live in a chapter,
/// chapters live in a course.
const CONTAINER_FIELDS: [&str; 2] = ["chapter_id", "course_id"];

/// Partition fields for stored records. Courses are their own partition.
const PARTITION_FIELDS: [&str; 3] = ["chapter_id", "course_id", "id"];

#[derive(Clone, FromField)]
struct ModelField {
    ident: Option<Ident>,
}

impl AsRef<Option<Ident>> for ModelField {
    fn as_ref(&self) -> &Option<Ident> {
        &self.ident
    }
}

#[derive(FromDeriveInput)]
#[darling(supports(struct_named))]
struct ModelStruct {
    ident: Ident,
    data: darling::ast::Data<(), ModelField>,
}

impl ModelStruct {
    fn fields(self) -> (Ident, Vec<ModelField>) {
        let fields = match self.data {
            darling::ast::Data::Struct(fields) => fields.fields,
            _ => Vec::new(),
        };

        (self.ident, fields)
    }
}

fn parse_model(input: TokenStream) -> Result<(Ident, Vec<ModelField>), TokenStream> {
    let ast: DeriveInput = match syn::parse(input) {
        Ok(ast) => ast,
        Err(e) => return Err(e.to_compile_error().into()),
    };

    ModelStruct::from_derive_input(&ast)
        .map(ModelStruct::fields)
        .map_err(|e| e.write_errors().into())
}

/// Implements `Orderable` for item models by naming convention: `id`, `title`, `order_index`,
/// `created_at` and a container field (`chapter_id` or `course_id`). An `is_preview` field
/// becomes the projection display flag. The item kind is the struct name.
///
/// Note: derives declared below `charybdis_model` are repeated on every partial model.
/// Partial models don't carry the full field set, so nothing is generated for them.
#[proc_macro_derive(Orderable)]
pub fn orderable_derive(input: TokenStream) -> TokenStream {
    let (name, fields) = match parse_model(input) {
        Ok(parsed) => parsed,
        Err(errors) => return errors,
    };

    let is_complete = ["id", "title", "order_index", "created_at"]
        .iter()
        .all(|field| fields.has_field(field));

    let container = match fields.first_field_of(&CONTAINER_FIELDS) {
        Some(container) if is_complete => container,
        _ => return TokenStream::new(),
    };

    let preview = if fields.has_field("is_preview") {
        quote! { self.is_preview }
    } else {
        quote! { false }
    };

    let expanded = quote! {
        impl crate::models::traits::Orderable for #name {
            const KIND: crate::ordering::ItemKind = crate::ordering::ItemKind::#name;

            fn id(&self) -> charybdis::types::Uuid {
                self.id
            }

            fn container_id(&self) -> charybdis::types::Uuid {
                self.#container
            }

            fn order_index(&self) -> charybdis::types::Int {
                self.order_index
            }

            fn set_order_index(&mut self, order_index: charybdis::types::Int) {
                self.order_index = order_index;
            }

            fn created_at(&self) -> charybdis::types::Timestamp {
                self.created_at
            }

            fn title(&self) -> &str {
                &self.title
            }

            fn preview(&self) -> bool {
                #preview
            }
        }
    };

    TokenStream::from(expanded)
}

/// Implements `Stored` so a model can travel through a transaction write set as a `Record`.
/// The collection and record variants share the struct name. The partition is the first of
/// `chapter_id`, `course_id` or `id`; `updated_at`, when present, is bumped by `touch`.
#[proc_macro_derive(Stored)]
pub fn stored_derive(input: TokenStream) -> TokenStream {
    let (name, fields) = match parse_model(input) {
        Ok(parsed) => parsed,
        Err(errors) => return errors,
    };

    if !fields.has_field("id") || !fields.has_field("created_at") {
        return TokenStream::new();
    }

    let partition = match fields.first_field_of(&PARTITION_FIELDS) {
        Some(partition) => partition,
        None => return TokenStream::new(),
    };

    let touch = if fields.has_field("updated_at") {
        quote! { self.updated_at = chrono::Utc::now(); }
    } else {
        quote! {}
    };

    let expanded = quote! {
        impl crate::models::traits::Stored for #name {
            const COLLECTION: crate::models::Collection = crate::models::Collection::#name;

            fn key(&self) -> charybdis::types::Uuid {
                self.id
            }

            fn partition_id(&self) -> charybdis::types::Uuid {
                self.#partition
            }

            fn touch(&mut self) {
                #touch
            }

            fn into_record(self) -> crate::models::Record {
                crate::models::Record::#name(self)
            }

            fn from_record(record: &crate::models::Record) -> Option<&Self> {
                match record {
                    crate::models::Record::#name(model) => Some(model),
                    _ => None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::traits::FieldNames;
    use super::ModelField;
    use proc_macro2::Span;
    use syn::Ident;

    fn field(name: &str) -> ModelField {
        ModelField {
            ident: Some(Ident::new(name, Span::call_site())),
        }
    }

    #[test]
    fn container_field_prefers_chapter() {
        let fields = vec![field("course_id"), field("chapter_id"), field("id")];

        let container = fields.first_field_of(&super::CONTAINER_FIELDS).map(|i| i.to_string());

        assert_eq!(container.as_deref(), Some("chapter_id"));
    }

    #[test]
    fn partial_model_has_no_created_at() {
        let fields = vec![field("chapter_id"), field("id"), field("order_index")];

        assert!(!fields.has_field("created_at"));
        assert!(fields.has_field("order_index"));
    }
}
