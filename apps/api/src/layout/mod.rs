// Page geometry and the printed-page estimate for a rendered preview.

pub mod handlers;
pub mod page;
