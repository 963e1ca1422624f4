// handlers/mod.rs - Handlers grouped by the access tier of their routes
//
// public    → no session required (/login, /logout, /notAuthorized, /health, /api/auth/login)
// protected → any authenticated session; USER role under /user/**
// elevated  → ADMIN role (/admin/**)
pub mod elevated;
pub mod protected;
pub mod public;
