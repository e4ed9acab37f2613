//! Order Data

use crate::domain::{
    carts::records::CartUuid,
    catalog::records::ProductUuid,
    orders::records::{OrderItemUuid, OrderUuid},
    users::records::UserUuid,
};

/// New Order Data
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub cart_uuid: CartUuid,
    pub coupon_code: Option<String>,
    pub currency: &'static str,
    pub subtotal: u64,
    pub discount: u64,
    pub grand_total: u64,
    pub payment_reference: Option<String>,
}

/// New Order Item Data
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub position: u32,
    pub product_name: String,
    pub price: u64,
    pub color_name: Option<String>,
    pub color_price: u64,
    pub size_name: Option<String>,
    pub size_price: u64,
    pub quantity: u32,
    pub total: u64,
}
