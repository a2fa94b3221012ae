//! Traits comunes de los repositorios
//!
//! Interfaces genéricas para las operaciones básicas sobre una tabla.
//! Las consultas propias de cada tabla viven como métodos inherentes
//! de cada repositorio.

/// Inserta una fila nueva
///
/// # Type Parameters
/// * `Entity` - Entidad devuelta, con el id asignado por la base de datos
/// * `CreateDTO` - Datos de creación (sin id)
pub trait Create<Entity, CreateDTO> {
    /// # Returns
    /// * `Ok(Entity)` - Entidad creada
    /// * `Err(sqlx::Error)` - Error en la inserción (p. ej. violación de UNIQUE)
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Lee una fila por clave primaria
///
/// # Type Parameters
/// * `Entity` - Entidad a leer
/// * `Id` - Tipo de la clave (`i64` o una tupla para claves compuestas)
pub trait Read<Entity, Id> {
    /// # Returns
    /// * `Ok(Some(Entity))` - Encontrada
    /// * `Ok(None)` - No existe
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Actualización parcial: solo se modifican los campos `Some(_)` del DTO
pub trait Update<Entity, UpdateDTO, Id> {
    /// # Returns
    /// * `Ok(Entity)` - Entidad actualizada
    /// * `Err(sqlx::Error::RowNotFound)` - No existe
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}

/// Borra una fila por clave primaria
pub trait Delete<Id> {
    /// Borrar una fila inexistente no es un error
    async fn delete(&self, id: &Id) -> Result<(), sqlx::Error>;
}
