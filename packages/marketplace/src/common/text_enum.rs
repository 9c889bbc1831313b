/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum that is
/// persisted as snake_case text.
///
/// ```ignore
/// text_enum!(ApprovalStatus, "approval status" {
///     Pending => "pending",
///     Approved => "approved",
/// });
/// ```
macro_rules! text_enum {
    ($name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> anyhow::Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(anyhow::anyhow!(concat!("Invalid ", $label, ": {}"), s)),
                }
            }
        }
    };
}

pub(crate) use text_enum;
