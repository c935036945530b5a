//! 모듈 간 파이프라인 테스트

pub mod legendre_test;
pub mod pipeline_test;
