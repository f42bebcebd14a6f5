pub mod asaas;
pub mod gemini;
pub mod util;
