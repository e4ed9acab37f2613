//! Cart Fixtures

use serde::Deserialize;

/// Cart from YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines to add, in order
    pub items: Vec<CartItemFixture>,

    /// Coupon key to apply after the lines are added
    #[serde(default)]
    pub coupon: Option<String>,
}

/// Cart line from YAML
#[derive(Debug, Deserialize)]
pub struct CartItemFixture {
    /// Product key
    pub product: String,

    /// Colour variant key
    #[serde(default)]
    pub color: Option<String>,

    /// Size variant key
    #[serde(default)]
    pub size: Option<String>,

    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
