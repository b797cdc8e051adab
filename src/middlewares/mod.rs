pub mod authmw;
