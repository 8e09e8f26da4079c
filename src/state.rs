use std::sync::Arc;

use rollbook_store::{EntityStore, MemoryStore};

use crate::config::AppConfig;
use crate::modules::classrooms::model::Classroom;
use crate::modules::classrooms::service::ClassroomService;
use crate::modules::schools::model::School;
use crate::modules::schools::service::SchoolService;
use crate::modules::students::model::Student;
use crate::modules::students::service::StudentService;
use crate::modules::users::model::User;
use crate::modules::users::service::UserService;

/// Composition root: constructs every service with its collaborators passed
/// explicitly. There is no ambient registry; anything a service needs
/// arrives through its constructor.
///
/// The raw store handles stay visible alongside the services, the way a
/// database pool would, so callers and tests can reach the persistence
/// layer directly.
pub struct AppState {
    pub config: AppConfig,
    pub school_store: Arc<dyn EntityStore<School>>,
    pub classroom_store: Arc<dyn EntityStore<Classroom>>,
    pub student_store: Arc<dyn EntityStore<Student>>,
    pub user_store: Arc<dyn EntityStore<User>>,
    pub schools: SchoolService,
    pub classrooms: ClassroomService,
    pub students: StudentService,
    pub users: UserService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let school_store: Arc<dyn EntityStore<School>> = Arc::new(MemoryStore::new());
        let classroom_store: Arc<dyn EntityStore<Classroom>> = Arc::new(MemoryStore::new());
        let student_store: Arc<dyn EntityStore<Student>> = Arc::new(MemoryStore::new());
        let user_store: Arc<dyn EntityStore<User>> = Arc::new(MemoryStore::new());

        let schools = SchoolService::new(
            school_store.clone(),
            classroom_store.clone(),
            student_store.clone(),
            user_store.clone(),
        );
        let classrooms = ClassroomService::new(
            classroom_store.clone(),
            school_store.clone(),
            student_store.clone(),
        );
        let students = StudentService::new(student_store.clone(), classroom_store.clone());
        let users = UserService::new(user_store.clone(), school_store.clone(), config.bcrypt_cost);

        Self {
            config,
            school_store,
            classroom_store,
            student_store,
            user_store,
            schools,
            classrooms,
            students,
            users,
        }
    }
}

pub fn init_app_state() -> AppState {
    let config = AppConfig::from_env();
    crate::logging::init(&config.log_level);
    AppState::new(config)
}
