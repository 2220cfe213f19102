// Promo Countdown Infrastructure - Page Adapter
// Implements: RenderTarget over promo page markup

pub mod error;
pub mod page;
pub mod target;

pub use error::PageError;
pub use page::PromoPage;
pub use target::PageRenderTarget;
