pub mod odoo;
pub mod openai;
