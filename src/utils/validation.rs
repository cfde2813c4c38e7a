use crate::utils::error::AppError;
use base64::Engine;

pub const MAX_MESSAGE_LENGTH: usize = 500;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024; // 1MB

/// Senha: mínimo 6 caracteres, com minúscula, maiúscula e dígito
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 6 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_lower || !has_upper || !has_digit {
        return Err(AppError::InvalidRequest(
            "Password must contain at least one lowercase letter, one uppercase letter, and one number".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.len() < 2 || trimmed.len() > 50 {
        return Err(AppError::InvalidRequest(
            "Name must be between 2 and 50 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), AppError> {
    if bio.len() > MAX_BIO_LENGTH {
        return Err(AppError::InvalidRequest(
            "Bio must be less than 500 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_skills(skills: &[String]) -> Result<(), AppError> {
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() || trimmed.len() > 30 {
            return Err(AppError::InvalidRequest(
                "Each skill must be between 1 and 30 characters".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn validate_message(message: &str) -> Result<(), AppError> {
    let trimmed = message.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_MESSAGE_LENGTH {
        return Err(AppError::InvalidRequest(
            "Message must be between 1 and 500 characters".to_string(),
        ));
    }
    Ok(())
}

/// Valida e decodifica imagem de perfil no formato data URL
/// (data:image/jpeg;base64,... ou data:image/png;base64,...)
pub fn validate_profile_image(data_url: &str) -> Result<Vec<u8>, AppError> {
    let payload = data_url
        .strip_prefix("data:image/jpeg;base64,")
        .or_else(|| data_url.strip_prefix("data:image/jpg;base64,"))
        .or_else(|| data_url.strip_prefix("data:image/png;base64,"))
        .ok_or_else(|| {
            AppError::InvalidRequest("Image must be JPEG or PNG format".to_string())
        })?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| AppError::InvalidRequest("Invalid image data".to_string()))?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::InvalidRequest(
            "Image size must be less than 1MB".to_string(),
        ));
    }

    // Confere os magic bytes do arquivo
    let is_jpeg = bytes.len() > 2 && bytes[0] == 0xFF && bytes[1] == 0xD8 && bytes[2] == 0xFF;
    let is_png = bytes.len() > 3
        && bytes[0] == 0x89
        && bytes[1] == 0x50
        && bytes[2] == 0x4E
        && bytes[3] == 0x47;

    if !is_jpeg && !is_png {
        return Err(AppError::InvalidRequest(
            "Invalid image file format".to_string(),
        ));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Abc123").is_ok());
        assert!(validate_password("abc123").is_err()); // sem maiúscula
        assert!(validate_password("ABC123").is_err()); // sem minúscula
        assert!(validate_password("Abcdef").is_err()); // sem dígito
        assert!(validate_password("Ab1").is_err()); // curta demais
    }

    #[test]
    fn test_message_bounds() {
        assert!(validate_message("Hello!").is_ok());
        assert!(validate_message("").is_err());
        assert!(validate_message("   ").is_err());
        assert!(validate_message(&"x".repeat(501)).is_err());
        assert!(validate_message(&"x".repeat(500)).is_ok());
    }

    #[test]
    fn test_profile_image_png() {
        let png = [0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        );
        assert_eq!(validate_profile_image(&data_url).unwrap(), png.to_vec());
    }

    #[test]
    fn test_profile_image_rejects_bad_magic() {
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode([0u8; 16])
        );
        assert!(validate_profile_image(&data_url).is_err());
    }

    #[test]
    fn test_profile_image_rejects_other_formats() {
        assert!(validate_profile_image("data:image/gif;base64,AAAA").is_err());
        assert!(validate_profile_image("not-a-data-url").is_err());
    }

    #[test]
    fn test_profile_image_rejects_oversized() {
        let mut big = vec![0xFFu8, 0xD8, 0xFF];
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        let data_url = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&big)
        );
        assert!(validate_profile_image(&data_url).is_err());
    }
}
