use crate::flyover::FlyoverResolver;

pub struct AppState {
    pub resolver: FlyoverResolver,
}
