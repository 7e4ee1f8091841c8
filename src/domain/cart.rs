use bigdecimal::BigDecimal;

use super::errors::DomainError;

/// Product display fields joined into cart lines and order items.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Price captured when the product was first added to the cart.
    pub unit_price: BigDecimal,
    pub product: ProductSummary,
}

impl CartLineView {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: BigDecimal,
}

impl CartView {
    pub fn from_lines(lines: Vec<CartLineView>) -> Self {
        let total: BigDecimal = lines.iter().map(CartLineView::subtotal).sum();
        Self { lines, total }
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }
}

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

pub fn validate_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(DomainError::InvalidInput(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(DomainError::InvalidInput(format!(
            "quantity cannot exceed {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}
