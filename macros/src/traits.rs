use syn::Ident;

pub trait FieldNames {
    fn has_field(&self, name: &str) -> bool;

    fn first_field_of(&self, names: &[&str]) -> Option<Ident>;
}

impl<T> FieldNames for Vec<T>
where
    T: AsRef<Option<Ident>>,
{
    fn has_field(&self, name: &str) -> bool {
        self.iter().any(|field| match field.as_ref() {
            Some(ident) => ident == name,
            None => false,
        })
    }

    fn first_field_of(&self, names: &[&str]) -> Option<Ident> {
        names.iter().find_map(|name| {
            self.iter().find_map(|field| match field.as_ref() {
                Some(ident) if ident == name => Some(ident.clone()),
                _ => None,
            })
        })
    }
}
