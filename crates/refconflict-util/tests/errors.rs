use refconflict_util::errors::RefConflictError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = RefConflictError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_config_error_display() {
    let err = RefConflictError::Config {
        message: "bad syntax".to_string(),
    };
    assert_eq!(err.to_string(), "Configuration error: bad syntax");
}

#[test]
fn test_app_config_error_display() {
    let err = RefConflictError::AppConfig {
        path: "App.exe.config".to_string(),
        message: "unexpected end of file".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Invalid application config App.exe.config: unexpected end of file"
    );
}

#[test]
fn test_conflicts_error_display() {
    let err = RefConflictError::Conflicts { count: 3 };
    assert_eq!(err.to_string(), "3 unresolved version conflict(s) found");
}

#[test]
fn test_generic_error_display() {
    let err = RefConflictError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: RefConflictError = io_err.into();
    assert!(matches!(err, RefConflictError::Io(_)));
}
