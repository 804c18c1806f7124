/// Generates typed accessors for fields stored in a material's uniform
/// block. Setters write through the uniform guard, so the backing buffer
/// version only moves when the value actually changes.
#[macro_export]
macro_rules! impl_uniform_accessors {
    (
        $struct_name:ident,
        [ $(($field:ident, $ty:ty, $doc:expr)),* $(,)? ]
    ) => {
        impl $struct_name {
            $(
                paste::paste! {
                    #[doc = $doc]
                    pub fn [<set_ $field>](&mut self, value: $ty) {
                        self.uniforms.write().$field = value;
                    }
                }

                #[must_use]
                pub fn $field(&self) -> $ty {
                    self.uniforms.read().$field
                }
            )*
        }
    };
}

/// Dispatches a method body over every [`MaterialData`] variant.
///
/// All variants expose the same `uniforms` field shape, which keeps the
/// closed-enum dispatch in `mod.rs` down to one arm per concern instead
/// of one `match` per variant per method.
macro_rules! for_each_material {
    ($value:expr, $m:ident => $body:expr) => {
        match $value {
            MaterialData::Basic($m) => $body,
            MaterialData::Lambert($m) => $body,
            MaterialData::Phong($m) => $body,
            MaterialData::Standard($m) => $body,
            MaterialData::Matcap($m) => $body,
            MaterialData::Depth($m) => $body,
            MaterialData::Distance($m) => $body,
            MaterialData::Points($m) => $body,
            MaterialData::Line($m) => $body,
            MaterialData::Sprite($m) => $body,
            MaterialData::Shadow($m) => $body,
            MaterialData::Shader($m) => $body,
        }
    };
}

pub(crate) use for_each_material;
